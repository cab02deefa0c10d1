//! Area-effect handler
//!
//! Three entry points:
//! - [`AoeHandler::execute_self`]: detonate centered on the caster
//! - [`AoeHandler::execute_lobbed`]: throw a carrier projectile whose travel
//!   distance scales with intensity
//! - [`AoeHandler::on_projectile_impact`]: detonate where a carrier (or an
//!   impacting projectile) lands
//!
//! Targets are chosen by effect: damage and debuffs hit the caster's foes,
//! heals and buffs land on the caster's allies, dual effects do both, and
//! revives look for tombstones. Membership is strict: `distance < radius`.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::simulation::arena::{Arena, ReviveRequest};
use crate::simulation::combatant::{EffectKind, PlayerId, TargetRef};
use crate::simulation::constants::*;
use crate::simulation::entities::{AbilityCore, AreaEffect, AreaPulse, Projectile, ProjectileRole};
use crate::simulation::geometry;
use crate::simulation::skill_config::{AoeDelivery, AoeEffect, AoeSkill};
use crate::simulation::status_effects::StatusEffects;

#[derive(Clone, Debug, Default)]
pub struct AoeHandler;

impl AoeHandler {
    /// Detonate around the caster. Returns false when the caster cannot act.
    pub fn execute_self(
        &self,
        arena: &mut Arena,
        effects: &StatusEffects,
        player_id: PlayerId,
        skill_name: &str,
        skill: &AoeSkill,
    ) -> bool {
        let Some(player) = arena.player(player_id).filter(|p| p.is_alive()) else {
            return false;
        };
        let center = player.position();
        let color = player.color;

        self.detonate(arena, effects, TargetRef::Player(player_id), skill_name, skill, center, color);
        true
    }

    /// Throw a carrier toward `direction`; it travels `range * intensity`.
    pub fn execute_lobbed(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill_name: &str,
        skill: &AoeSkill,
        direction: Vec2,
        intensity: f32,
    ) -> bool {
        let Some(player) = arena.player(player_id).filter(|p| p.is_alive()) else {
            return false;
        };
        let origin = player.position();
        let color = player.color;

        let (range, speed) = match skill.delivery {
            AoeDelivery::Lobbed { range, speed } => (
                range.unwrap_or(DEFAULT_LOB_RANGE),
                speed.unwrap_or(DEFAULT_LOB_SPEED),
            ),
            AoeDelivery::SelfCentered => (DEFAULT_LOB_RANGE, DEFAULT_LOB_SPEED),
        };
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let distance = range * intensity;
        let direction = geometry::normalize_or(direction, geometry::DEFAULT_DIRECTION);

        let carrier_radius = if skill.radius > 0.0 {
            skill.radius / LOB_CARRIER_RADIUS_DIVISOR
        } else {
            DEFAULT_LOB_CARRIER_RADIUS
        };
        let core = AbilityCore::new(origin, TargetRef::Player(player_id), arena.now)
            .with_radius(carrier_radius)
            .with_lifetime(PROJECTILE_LIFETIME.max(f64::from(distance / speed.max(1.0)) * 1000.0 + 100.0))
            .with_color(color);

        let mut carrier = Projectile::new(core, skill_name, direction * speed, distance);
        carrier.pierce = true;
        carrier.role = ProjectileRole::AoeCarrier(skill.clone());
        arena.projectiles.push(carrier);
        true
    }

    /// Detonate an area at `position` on behalf of `owner`.
    pub fn on_projectile_impact(
        &self,
        arena: &mut Arena,
        effects: &StatusEffects,
        owner: TargetRef,
        skill_name: &str,
        skill: &AoeSkill,
        position: Vec2,
    ) -> usize {
        let color = match owner {
            TargetRef::Player(id) => arena.player(id).map(|p| p.color).unwrap_or([1.0; 3]),
            _ => [0.4, 1.0, 0.2],
        };
        self.detonate(arena, effects, owner, skill_name, skill, position, color)
    }

    /// Apply the area once and leave its visual (and pulse schedule) behind.
    /// Returns the number of targets affected.
    #[allow(clippy::too_many_arguments)]
    pub fn detonate(
        &self,
        arena: &mut Arena,
        effects: &StatusEffects,
        owner: TargetRef,
        skill_name: &str,
        skill: &AoeSkill,
        center: Vec2,
        color: [f32; 3],
    ) -> usize {
        let affected = self.apply_area(arena, effects, owner, skill_name, skill, center);

        let core = AbilityCore::new(center, owner, arena.now)
            .with_radius(skill.radius)
            .with_lifetime(skill.duration.unwrap_or(AREA_EFFECT_LIFETIME))
            .with_color(color);
        let mut area = AreaEffect::new(core, skill_name, skill.damage, skill.heal_amount);
        area.mark_damage_dealt();
        if let Some(interval) = skill.tick_rate.filter(|t| *t > 0.0) {
            area.pulse = Some(AreaPulse {
                skill: skill.clone(),
                interval,
                next_at: arena.now + interval,
            });
        }
        arena.area_effects.push(area);

        affected
    }

    /// Apply the area's effect to every eligible target inside it.
    pub fn apply_area(
        &self,
        arena: &mut Arena,
        effects: &StatusEffects,
        owner: TargetRef,
        skill_name: &str,
        skill: &AoeSkill,
        center: Vec2,
    ) -> usize {
        let multiplier = arena
            .combatant(owner)
            .map(|c| c.outgoing_damage_multiplier())
            .unwrap_or(1.0);
        let damage = skill.damage * multiplier;

        let inside = |bodies: SmallVec<[(TargetRef, Vec2, f32); 8]>| -> SmallVec<[TargetRef; 8]> {
            bodies
                .into_iter()
                .filter(|(_, position, _)| geometry::within_radius(center, skill.radius, *position))
                .map(|(target, _, _)| target)
                .collect()
        };
        let foes = inside(arena.foes_of(owner));
        let allies = inside(arena.allies_of(owner));

        match &skill.effect {
            AoeEffect::Damage => {
                for target in &foes {
                    arena.apply_damage(effects, owner, *target, skill_name, damage);
                }
                foes.len()
            }
            AoeEffect::Heal => {
                for target in &allies {
                    arena.apply_healing(effects, owner, *target, skill_name, skill.heal_amount);
                }
                allies.len()
            }
            AoeEffect::Buff(params) => {
                for target in &allies {
                    arena.apply_status(effects, *target, EffectKind::Buff, params);
                    if skill.heal_amount > 0.0 {
                        arena.apply_healing(effects, owner, *target, skill_name, skill.heal_amount);
                    }
                }
                allies.len()
            }
            AoeEffect::Debuff(params) => {
                for target in &foes {
                    if damage > 0.0 {
                        arena.apply_damage(effects, owner, *target, skill_name, damage);
                    }
                    arena.apply_status(effects, *target, EffectKind::Debuff, params);
                }
                foes.len()
            }
            AoeEffect::Dual => {
                for target in &foes {
                    arena.apply_damage(effects, owner, *target, skill_name, damage);
                }
                for target in &allies {
                    arena.apply_healing(effects, owner, *target, skill_name, skill.heal_amount);
                }
                foes.len() + allies.len()
            }
            AoeEffect::Revive { heal_percent } => {
                let heal_percent = heal_percent.unwrap_or(DEFAULT_REVIVE_PERCENT);
                let requests: SmallVec<[ReviveRequest; 4]> = arena
                    .tombstones
                    .iter()
                    .filter(|t| geometry::within_radius(center, skill.radius, t.position))
                    .map(|t| ReviveRequest {
                        player_id: t.player_id,
                        heal_percent,
                    })
                    .collect();
                if !requests.is_empty() {
                    info!("{} reaches {} fallen player(s)", skill_name, requests.len());
                }
                let count = requests.len();
                arena.revive_requests.extend(requests);
                count
            }
        }
    }
}
