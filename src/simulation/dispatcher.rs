//! Skill dispatcher
//!
//! Entry point for every skill press. `handle_skill`:
//! 1. normalizes the raw input
//! 2. continues a held shield or cast on HOLD/RELEASE (never starts a new one)
//! 3. rejects dead or stunned players, bad slots and slots on cooldown
//! 4. resolves the slot's [`SkillConfig`] for the player's class
//! 5. routes by [`SkillKind`] to the matching handler
//! 6. on success only, commits the cooldown and queues a [`CooldownNotice`]
//!
//! Cast payloads come back through [`PayloadRouter`] with a depth limit.

use bevy::prelude::*;
use smallvec::SmallVec;
use std::f32::consts::TAU;

use crate::combat::log::CombatLogEventType;

use super::arena::{Arena, CooldownNotice};
use super::combatant::{EffectKind, PlayerId, TargetRef};
use super::constants::*;
use super::entities::{AbilityCore, Projectile, ProjectileRole};
use super::geometry;
use super::handlers::{AoeHandler, CastHandler, DashHandler, MeleeHandler, PayloadRouter, ShieldHandler};
use super::input::{RawSkillInput, SkillAction, SkillInput};
use super::skill_config::{
    AoeDelivery, BuffSkill, BuffTarget, DashMode, ProjectilePattern, ProjectileSkill,
    SkillConfig, SkillDatabase, SkillKind,
};
use super::status_effects::StatusEffects;

/// Owns the skill database and every handler.
#[derive(Resource, Clone, Debug)]
pub struct SkillDispatcher {
    database: SkillDatabase,
    pub effects: StatusEffects,
    pub melee: MeleeHandler,
    pub aoe: AoeHandler,
    pub cast: CastHandler,
    pub shield: ShieldHandler,
    pub dash: DashHandler,
}

impl SkillDispatcher {
    pub fn new(database: SkillDatabase) -> Self {
        Self {
            database,
            effects: StatusEffects::default(),
            melee: MeleeHandler::default(),
            aoe: AoeHandler,
            cast: CastHandler,
            shield: ShieldHandler::default(),
            dash: DashHandler::default(),
        }
    }

    pub fn database(&self) -> &SkillDatabase {
        &self.database
    }

    /// Resolve the configuration for a player's slot.
    pub fn skill_for(&self, arena: &Arena, player_id: PlayerId, slot: usize) -> Option<&SkillConfig> {
        let class = arena.player(player_id)?.class;
        self.database.skill(class, slot)
    }

    /// Handle one skill press. Returns whether the skill executed (or a held
    /// skill was continued).
    pub fn handle_skill(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        slot: usize,
        raw: &RawSkillInput,
    ) -> bool {
        let input = SkillInput::normalize(raw);
        let now = arena.now;

        let Some(player) = arena.player(player_id) else {
            return false;
        };
        if !player.can_act() {
            return false;
        }

        if let Some(handled) = self.continue_held_skill(arena, player_id, slot, &input) {
            return handled;
        }
        // Only START begins a skill; HOLD and RELEASE merely continue one.
        if input.action != SkillAction::Start {
            return false;
        }

        if slot >= SKILL_SLOTS {
            return false;
        }
        let Some(player) = arena.player(player_id) else {
            return false;
        };
        if player.cooldowns[slot] > now {
            return false;
        }

        let Some(config) = self.database.skill(player.class, slot) else {
            warn!(
                "No skill configured for {} slot {}",
                player.class.name(),
                slot
            );
            return false;
        };
        let player_name = player.combatant.name.clone();

        if !self.execute_skill(arena, player_id, Some(slot), &config.name, &config.kind, &input, 0) {
            debug!("{} {} had no effect for {}", config.kind.label(), config.name, player_name);
            return false;
        }

        let cooldown_end = now + config.cooldown.max(0.0);
        if let Some(player) = arena.player_mut(player_id) {
            player.cooldowns[slot] = cooldown_end;
            player.facing = input.direction;
        }
        arena.cooldown_notices.push(CooldownNotice {
            player_id,
            skill_index: slot,
            cooldown_duration: config.cooldown.max(0.0),
            cooldown_end,
        });
        arena.log.log(
            CombatLogEventType::AbilityUsed,
            format!("{} uses {}", player_name, config.name),
        );
        true
    }

    /// HOLD re-aims a raised shield or keeps charging; RELEASE lowers the
    /// shield or ends the cast (completing it if fully charged).
    fn continue_held_skill(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        slot: usize,
        input: &SkillInput,
    ) -> Option<bool> {
        if input.action == SkillAction::Start {
            return None;
        }
        let player = arena.player(player_id)?;

        let shield_held = player
            .shield_state
            .as_ref()
            .is_some_and(|s| s.active && s.slot == Some(slot));
        let cast_held = player
            .cast_state
            .as_ref()
            .is_some_and(|c| c.active && c.slot == Some(slot));

        if shield_held {
            return Some(match input.action {
                SkillAction::Release => self.shield.deactivate(arena, player_id),
                _ => self.shield.update_angle(arena, player_id, input.direction),
            });
        }
        if cast_held {
            return Some(match input.action {
                SkillAction::Release => {
                    if self.cast.cast_progress(arena, player_id) >= 1.0 {
                        self.complete_cast(arena, player_id)
                    } else {
                        self.cast.cancel_cast(arena, player_id)
                    }
                }
                _ => true,
            });
        }
        None
    }

    /// Route a skill to its handler. `slot` is None for cast payloads.
    #[allow(clippy::too_many_arguments)]
    pub fn execute_skill(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        slot: Option<usize>,
        skill_name: &str,
        kind: &SkillKind,
        input: &SkillInput,
        depth: u8,
    ) -> bool {
        match kind {
            SkillKind::Melee(melee) => {
                self.melee
                    .execute(arena, &self.effects, player_id, skill_name, melee, input.direction);
                true
            }
            SkillKind::Projectile(projectile) => {
                self.spawn_projectiles(arena, player_id, skill_name, projectile, input.direction) > 0
            }
            SkillKind::Aoe(aoe) => match aoe.delivery {
                AoeDelivery::SelfCentered => {
                    self.aoe
                        .execute_self(arena, &self.effects, player_id, skill_name, aoe)
                }
                AoeDelivery::Lobbed { .. } => self.aoe.execute_lobbed(
                    arena,
                    player_id,
                    skill_name,
                    aoe,
                    input.direction,
                    input.intensity,
                ),
            },
            SkillKind::Cast(cast) => {
                self.cast
                    .start_cast(arena, player_id, slot, skill_name, cast, input, depth)
            }
            SkillKind::Shield(shield) => {
                self.shield
                    .activate(arena, player_id, slot, shield, input.direction)
            }
            SkillKind::Dash(dash) => match dash.mode {
                DashMode::Teleport => {
                    self.dash
                        .execute_teleport(arena, player_id, dash, input.direction)
                }
                DashMode::Forward | DashMode::Backwards => {
                    self.dash.execute_dash(arena, player_id, dash, input.direction)
                }
            },
            SkillKind::Buff(buff) => self.apply_buff_skill(arena, player_id, skill_name, buff),
        }
    }

    /// Finish the player's active cast and execute its payload.
    pub fn complete_cast(&self, arena: &mut Arena, player_id: PlayerId) -> bool {
        self.cast.complete_cast(arena, player_id, self)
    }

    /// Spawn the projectiles of one skill use. Returns how many were spawned.
    pub fn spawn_projectiles(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill_name: &str,
        skill: &ProjectileSkill,
        direction: Vec2,
    ) -> usize {
        let Some(player) = arena.player(player_id).filter(|p| p.is_alive()) else {
            return 0;
        };
        let origin = player.position();
        let color = player.color;
        let damage = skill.damage * player.combatant.outgoing_damage_multiplier();
        let now = arena.now;

        let base_angle = geometry::vector_angle(direction);
        let angles = fan_angles(base_angle, skill.pattern);

        for angle in &angles {
            let velocity = geometry::direction_from_angle(*angle) * skill.speed;
            let core = AbilityCore::new(origin, TargetRef::Player(player_id), now)
                .with_radius(skill.radius)
                .with_lifetime(PROJECTILE_LIFETIME)
                .with_color(color);
            let mut projectile = Projectile::new(core, skill_name, velocity, skill.range);
            projectile.damage = damage;
            projectile.heal_amount = skill.heal_amount;
            projectile.effect = skill.effect;
            projectile.pierce = skill.pierce;
            projectile.role = ProjectileRole::Direct {
                on_impact: skill.on_impact.clone(),
            };
            arena.projectiles.push(projectile);
        }
        angles.len()
    }

    fn apply_buff_skill(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill_name: &str,
        skill: &BuffSkill,
    ) -> bool {
        let now = arena.now;
        let Some(caster) = arena.player(player_id).filter(|p| p.is_alive()) else {
            return false;
        };

        if skill.toggle {
            let Some(player) = arena.player_mut(player_id) else {
                return false;
            };
            let enabled = self.effects.toggle_buff(&mut player.combatant, &skill.effect, now);
            let message = format!(
                "{} {} {}",
                player.combatant.name,
                if enabled { "enters" } else { "leaves" },
                skill_name
            );
            let event_type = if enabled {
                CombatLogEventType::AuraApplied
            } else {
                CombatLogEventType::AuraRemoved
            };
            arena.log.log(event_type, message);
            return true;
        }

        let target = match skill.target {
            BuffTarget::Caster => player_id,
            BuffTarget::NearestAlly { range } => {
                let origin = caster.position();
                arena
                    .players
                    .iter()
                    .filter(|p| p.is_alive() && p.combatant.hp < p.combatant.max_hp)
                    .filter(|p| geometry::distance(origin, p.position()) <= range)
                    .min_by(|a, b| {
                        a.combatant
                            .hp_fraction()
                            .total_cmp(&b.combatant.hp_fraction())
                    })
                    .map(|p| p.id)
                    .unwrap_or(player_id)
            }
        };

        arena
            .apply_status(&self.effects, TargetRef::Player(target), EffectKind::Buff, &skill.effect)
            .is_some()
    }
}

impl PayloadRouter for SkillDispatcher {
    fn route_payload(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill_name: &str,
        payload: &SkillKind,
        input: &SkillInput,
        depth: u8,
    ) -> bool {
        if depth > MAX_PAYLOAD_DEPTH {
            warn!("{}: payload depth {} exceeds limit", skill_name, depth);
            return false;
        }
        self.execute_skill(arena, player_id, None, skill_name, payload, input, depth)
    }
}

/// Launch angles for a projectile pattern around `base`.
///
/// Multi patterns spread `count` projectiles evenly across `spread_angle`,
/// symmetric about `base`; radial patterns cover the full circle.
pub fn fan_angles(base: f32, pattern: ProjectilePattern) -> SmallVec<[f32; 8]> {
    match pattern {
        ProjectilePattern::Single => smallvec::smallvec![base],
        ProjectilePattern::Multi { count, spread_angle } => match count {
            0 => SmallVec::new(),
            1 => smallvec::smallvec![base],
            n => {
                let step = spread_angle / (n - 1) as f32;
                (0..n)
                    .map(|i| base - spread_angle / 2.0 + step * i as f32)
                    .collect()
            }
        },
        ProjectilePattern::Radial { count } => {
            let step = TAU / count.max(1) as f32;
            (0..count).map(|i| base + step * i as f32).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_fan_angles_are_symmetric() {
        let base = 0.3;
        let angles = fan_angles(
            base,
            ProjectilePattern::Multi {
                count: 6,
                spread_angle: FRAC_PI_2,
            },
        );
        assert_eq!(angles.len(), 6);
        for i in 0..3 {
            let left = base - angles[i];
            let right = angles[5 - i] - base;
            assert!((left - right).abs() < 1e-5, "pair {} not symmetric", i);
        }
        let step = angles[1] - angles[0];
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-5, "angles must be evenly spaced");
        }
        assert!((angles[5] - angles[0] - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_fan_angle_edge_counts() {
        let none = fan_angles(1.0, ProjectilePattern::Multi { count: 0, spread_angle: 1.0 });
        assert!(none.is_empty());
        let one = fan_angles(1.0, ProjectilePattern::Multi { count: 1, spread_angle: 1.0 });
        assert_eq!(one.as_slice(), &[1.0]);
        let radial = fan_angles(0.0, ProjectilePattern::Radial { count: 4 });
        assert_eq!(radial.len(), 4);
        assert!((radial[2] - std::f32::consts::PI).abs() < 1e-5);
    }
}
