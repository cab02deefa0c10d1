//! Arena state
//!
//! The [`Arena`] resource is the live-entity registry the handlers read and
//! write: players, hostiles, tombstones, ability entities, the outboxes for
//! revives and cooldown notices, and the combat log.
//!
//! Every hp change goes through [`Arena::apply_damage`] or
//! [`Arena::apply_healing`] so damage counters, heal pulses and the combat log
//! stay consistent.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::log::{CombatLog, CombatLogEventType};

use super::combatant::{Combatant, CombatantKind, EffectKind, PlayerId, TargetRef, UnitId};
use super::constants::*;
use super::entities::{AreaEffect, HealPulse, MeleeSwing, Projectile};
use super::geometry::{self, ArenaBounds};
use super::input::SkillInput;
use super::skill_config::{
    BossConfig, CastSkill, ClassConfig, EffectParams, EnemyConfig, PlayerClass,
};
use super::status_effects::{DamageOutcome, StatusEffects};

/// Position, radius and identity of a potential target, collected before mutation.
pub type TargetBody = (TargetRef, Vec2, f32);
pub type TargetBodies = SmallVec<[TargetBody; 8]>;

// ============================================================================
// Player state machines
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct CastState {
    /// Skill bar slot that started the cast (None for nested payloads)
    pub slot: Option<usize>,
    pub skill_name: String,
    pub active: bool,
    pub start_time: f64,
    pub cast_time: f64,
    pub skill: CastSkill,
    pub input: SkillInput,
    /// Position when the cast began
    pub origin: Vec2,
    pub channeled: bool,
    /// Payload nesting level this cast was started at
    pub depth: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShieldState {
    pub slot: Option<usize>,
    pub active: bool,
    pub start_time: f64,
    pub duration: f64,
    /// Blocking arc in radians
    pub arc: f32,
    /// Facing in radians
    pub angle: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashState {
    pub active: bool,
    pub start_time: f64,
    pub duration: f64,
    pub origin: Vec2,
    pub destination: Vec2,
    /// Displacement per ms
    pub velocity: Vec2,
}

// ============================================================================
// Actors
// ============================================================================

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub class: PlayerClass,
    pub color: [f32; 3],
    pub combatant: Combatant,
    /// Desired movement direction from the movement collaborator
    pub move_input: Vec2,
    /// Last aim direction
    pub facing: Vec2,
    /// Per-slot time (ms) at which the slot is ready again
    pub cooldowns: [f64; SKILL_SLOTS],
    pub cast_state: Option<CastState>,
    pub shield_state: Option<ShieldState>,
    pub dash_state: Option<DashState>,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.combatant.is_alive()
    }

    pub fn position(&self) -> Vec2 {
        self.combatant.position
    }

    /// Alive and not stunned.
    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.combatant.is_stunned
    }

    pub fn is_casting(&self) -> bool {
        self.cast_state.as_ref().is_some_and(|c| c.active)
    }

    pub fn is_shielding(&self) -> bool {
        self.shield_state.as_ref().is_some_and(|s| s.active)
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_state.as_ref().is_some_and(|d| d.active)
    }

    /// Remaining cooldown of `slot` in ms; unknown slots report zero.
    pub fn cooldown_remaining(&self, slot: usize, now: f64) -> f64 {
        self.cooldowns
            .get(slot)
            .map(|ready_at| (ready_at - now).max(0.0))
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub id: UnitId,
    pub combatant: Combatant,
    pub config: BossConfig,
    pub phase: usize,
    /// Per-ability ready time in ms
    pub ability_ready_at: Vec<f64>,
    pub next_ability_at: f64,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: UnitId,
    pub combatant: Combatant,
    pub attack_range: f32,
    pub damage: f32,
    pub attack_cooldown: f64,
    pub next_attack_at: f64,
}

/// Marker left where a player died.
#[derive(Clone, Debug, PartialEq)]
pub struct Tombstone {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
}

/// Request to bring a dead player back, produced by revive effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReviveRequest {
    pub player_id: PlayerId,
    pub heal_percent: f32,
}

/// Emitted once per successful skill use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CooldownNotice {
    pub player_id: PlayerId,
    pub skill_index: usize,
    /// Cooldown length in ms
    pub cooldown_duration: f64,
    /// Time (ms) the slot is ready again
    pub cooldown_end: f64,
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Resource)]
pub struct Arena {
    /// Simulation clock in ms
    pub now: f64,
    pub bounds: ArenaBounds,
    pub players: Vec<Player>,
    pub bosses: Vec<Boss>,
    pub enemies: Vec<Enemy>,
    pub tombstones: Vec<Tombstone>,
    pub projectiles: Vec<Projectile>,
    pub melee_swings: Vec<MeleeSwing>,
    pub area_effects: Vec<AreaEffect>,
    pub heal_pulses: Vec<HealPulse>,
    pub revive_requests: Vec<ReviveRequest>,
    pub cooldown_notices: Vec<CooldownNotice>,
    pub log: CombatLog,
    next_player_id: u32,
    next_unit_id: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaBounds::default())
    }
}

impl Arena {
    pub fn new(bounds: ArenaBounds) -> Self {
        Self {
            now: 0.0,
            bounds,
            players: Vec::new(),
            bosses: Vec::new(),
            enemies: Vec::new(),
            tombstones: Vec::new(),
            projectiles: Vec::new(),
            melee_swings: Vec::new(),
            area_effects: Vec::new(),
            heal_pulses: Vec::new(),
            revive_requests: Vec::new(),
            cooldown_notices: Vec::new(),
            log: CombatLog::default(),
            next_player_id: 1,
            next_unit_id: 1,
        }
    }

    /// Advance the clock by `dt_ms` and keep the log's match time in sync.
    pub fn advance_clock(&mut self, dt_ms: f64) {
        self.now += dt_ms.max(0.0);
        self.log.match_time = (self.now / 1000.0) as f32;
    }

    // ------------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------------

    pub fn add_player(
        &mut self,
        class: PlayerClass,
        config: &ClassConfig,
        name: impl Into<String>,
        position: Vec2,
    ) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;

        let combatant = Combatant::new(
            CombatantKind::Player,
            name,
            position,
            PLAYER_RADIUS,
            config.max_hp,
            config.speed,
        );
        self.players.push(Player {
            id,
            class,
            color: config.color,
            combatant,
            move_input: Vec2::ZERO,
            facing: geometry::DEFAULT_DIRECTION,
            cooldowns: [0.0; SKILL_SLOTS],
            cast_state: None,
            shield_state: None,
            dash_state: None,
        });
        id
    }

    pub fn add_boss(&mut self, config: &BossConfig, position: Vec2) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let combatant = Combatant::new(
            CombatantKind::Boss,
            config.name.clone(),
            position,
            BOSS_RADIUS,
            config.max_hp,
            config.speed,
        );
        self.bosses.push(Boss {
            id,
            combatant,
            config: config.clone(),
            phase: 0,
            ability_ready_at: vec![0.0; config.abilities.len()],
            next_ability_at: self.now + BOSS_OPENING_DELAY,
        });
        id
    }

    pub fn add_enemy(&mut self, config: &EnemyConfig, position: Vec2) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let combatant = Combatant::new(
            CombatantKind::Enemy,
            format!("Demon {}", id.0),
            position,
            ENEMY_RADIUS,
            config.max_hp,
            config.speed,
        );
        self.enemies.push(Enemy {
            id,
            combatant,
            attack_range: config.attack_range,
            damage: config.damage,
            attack_cooldown: config.attack_cooldown,
            next_attack_at: 0.0,
        });
        id
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn boss(&self, id: UnitId) -> Option<&Boss> {
        self.bosses.iter().find(|b| b.id == id)
    }

    pub fn combatant(&self, target: TargetRef) -> Option<&Combatant> {
        match target {
            TargetRef::Player(id) => self.player(id).map(|p| &p.combatant),
            TargetRef::Boss(id) => self.boss(id).map(|b| &b.combatant),
            TargetRef::Enemy(id) => self
                .enemies
                .iter()
                .find(|e| e.id == id)
                .map(|e| &e.combatant),
        }
    }

    pub fn combatant_mut(&mut self, target: TargetRef) -> Option<&mut Combatant> {
        match target {
            TargetRef::Player(id) => self.player_mut(id).map(|p| &mut p.combatant),
            TargetRef::Boss(id) => self
                .bosses
                .iter_mut()
                .find(|b| b.id == id)
                .map(|b| &mut b.combatant),
            TargetRef::Enemy(id) => self
                .enemies
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| &mut e.combatant),
        }
    }

    pub fn display_name(&self, target: TargetRef) -> String {
        self.combatant(target)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Living boss and enemies.
    pub fn hostile_bodies(&self) -> TargetBodies {
        let bosses = self
            .bosses
            .iter()
            .filter(|b| b.combatant.is_alive())
            .map(|b| (TargetRef::Boss(b.id), b.combatant.position, b.combatant.radius));
        let enemies = self
            .enemies
            .iter()
            .filter(|e| e.combatant.is_alive())
            .map(|e| (TargetRef::Enemy(e.id), e.combatant.position, e.combatant.radius));
        bosses.chain(enemies).collect()
    }

    /// Living players.
    pub fn player_bodies(&self) -> TargetBodies {
        self.players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| (TargetRef::Player(p.id), p.position(), p.combatant.radius))
            .collect()
    }

    /// Living targets on the opposing side of `owner`.
    pub fn foes_of(&self, owner: TargetRef) -> TargetBodies {
        if owner.is_hostile() {
            self.player_bodies()
        } else {
            self.hostile_bodies()
        }
    }

    /// Living targets on the same side as `owner` (including the owner).
    pub fn allies_of(&self, owner: TargetRef) -> TargetBodies {
        if owner.is_hostile() {
            self.hostile_bodies()
        } else {
            self.player_bodies()
        }
    }

    /// Nearest living player to `point`.
    pub fn nearest_living_player(&self, point: Vec2) -> Option<(PlayerId, Vec2, f32)> {
        self.players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| (p.id, p.position(), p.combatant.radius))
            .min_by(|a, b| {
                geometry::distance(point, a.1).total_cmp(&geometry::distance(point, b.1))
            })
    }

    pub fn living_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    pub fn live_entity_count(&self) -> usize {
        self.projectiles.len()
            + self.melee_swings.len()
            + self.area_effects.len()
            + self.heal_pulses.len()
    }

    // ------------------------------------------------------------------------
    // HP changes
    // ------------------------------------------------------------------------

    /// Damage `target` on behalf of `source`, crediting and logging the result.
    pub fn apply_damage(
        &mut self,
        effects: &StatusEffects,
        source: TargetRef,
        target: TargetRef,
        ability: &str,
        amount: f32,
    ) -> DamageOutcome {
        let source_name = self.display_name(source);
        let target_name = self.display_name(target);

        let Some(combatant) = self.combatant_mut(target) else {
            return DamageOutcome::default();
        };
        let outcome = effects.apply_damage(combatant, amount);
        if outcome.dealt <= 0.0 && outcome.absorbed <= 0.0 {
            return outcome;
        }

        if let Some(attacker) = self.combatant_mut(source) {
            attacker.damage_dealt += outcome.dealt;
        }

        let mut message = format!(
            "{}'s {} hits {} for {:.0}",
            source_name, ability, target_name, outcome.dealt
        );
        if outcome.absorbed > 0.0 {
            message.push_str(&format!(" ({:.0} absorbed)", outcome.absorbed));
        }
        self.log.log_damage(
            source_name.clone(),
            target_name.clone(),
            ability.to_string(),
            outcome.dealt,
            outcome.killed,
            message,
        );

        if outcome.killed {
            self.log.log_death(
                target_name.clone(),
                Some(source_name.clone()),
                format!("{} has been slain by {}", target_name, source_name),
            );
        }
        outcome
    }

    /// Heal `target` on behalf of `source`. Spawns a heal pulse when hp was restored.
    pub fn apply_healing(
        &mut self,
        effects: &StatusEffects,
        source: TargetRef,
        target: TargetRef,
        ability: &str,
        amount: f32,
    ) -> f32 {
        let source_name = self.display_name(source);
        let target_name = self.display_name(target);
        let now = self.now;

        let Some(combatant) = self.combatant_mut(target) else {
            return 0.0;
        };
        let healed = effects.apply_healing(combatant, amount);
        if healed <= 0.0 {
            return 0.0;
        }
        let position = combatant.position;

        if let Some(healer) = self.combatant_mut(source) {
            healer.healing_done += healed;
        }
        self.heal_pulses.push(HealPulse::new(position, source, healed, now));
        self.log.log_healing(
            source_name.clone(),
            target_name.clone(),
            ability.to_string(),
            healed,
            format!(
                "{}'s {} heals {} for {:.0}",
                source_name, ability, target_name, healed
            ),
        );
        healed
    }

    /// Apply a buff or debuff to a living target and log it.
    pub fn apply_status(
        &mut self,
        effects: &StatusEffects,
        target: TargetRef,
        kind: EffectKind,
        params: &EffectParams,
    ) -> Option<u64> {
        let now = self.now;
        let target_name = self.display_name(target);
        let combatant = self.combatant_mut(target)?;
        if !combatant.is_alive() {
            return None;
        }

        let id = match kind {
            EffectKind::Buff => effects.apply_buff(combatant, params, now),
            EffectKind::Debuff => effects.apply_debuff(combatant, params, now),
        };

        let effect_name = params.name.clone().unwrap_or_else(|| format!("{:?}", kind));
        let event_type = if params.rooted || params.stunned {
            CombatLogEventType::CrowdControl
        } else {
            CombatLogEventType::AuraApplied
        };
        self.log.log(
            event_type,
            format!("{} is affected by {}", target_name, effect_name),
        );
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Death and revival
    // ------------------------------------------------------------------------

    /// Leave tombstones for players who died since the last sweep and drop
    /// their transient states.
    pub fn sweep_player_deaths(&mut self, effects: &StatusEffects) {
        for player in self.players.iter_mut().filter(|p| !p.is_alive()) {
            if self.tombstones.iter().any(|t| t.player_id == player.id) {
                continue;
            }
            player.cast_state = None;
            player.shield_state = None;
            player.dash_state = None;
            player.move_input = Vec2::ZERO;
            player.combatant.modifiers = Default::default();
            effects.clear_all_effects(&mut player.combatant);

            self.tombstones.push(Tombstone {
                player_id: player.id,
                name: player.combatant.name.clone(),
                position: player.combatant.position,
                radius: TOMBSTONE_RADIUS,
            });
            info!("{} has fallen", player.combatant.name);
        }
    }

    /// Apply queued revive requests. Requests for living players are dropped.
    pub fn process_revive_requests(&mut self, effects: &StatusEffects) -> usize {
        let requests = std::mem::take(&mut self.revive_requests);
        let mut revived = 0;

        for request in requests {
            let Some(player) = self.players.iter_mut().find(|p| p.id == request.player_id) else {
                continue;
            };
            if player.is_alive() {
                continue;
            }

            effects.clear_all_effects(&mut player.combatant);
            let percent = request.heal_percent.clamp(0.01, 1.0);
            player.combatant.hp = (player.combatant.max_hp * percent).max(1.0);
            player.combatant.temp_shield = 0.0;
            player.combatant.debug_validate();

            if let Some(index) = self
                .tombstones
                .iter()
                .position(|t| t.player_id == request.player_id)
            {
                let tombstone = self.tombstones.remove(index);
                player.combatant.position = tombstone.position;
            }

            self.log.log_revive(
                player.combatant.name.clone(),
                percent,
                format!(
                    "{} is revived with {:.0} hp",
                    player.combatant.name, player.combatant.hp
                ),
            );
            revived += 1;
        }
        revived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::skill_config::SkillDatabase;

    fn create_test_arena() -> (Arena, PlayerId, UnitId) {
        let database = SkillDatabase::builtin().expect("built-in database");
        let mut arena = Arena::default();
        let class = database
            .class_config(PlayerClass::Warrior)
            .expect("warrior config");
        let player = arena.add_player(PlayerClass::Warrior, class, "Thrall", Vec2::new(100.0, 100.0));
        let boss = arena.add_boss(&database.boss, Vec2::new(500.0, 300.0));
        (arena, player, boss)
    }

    #[test]
    fn test_damage_is_credited_and_logged() {
        let (mut arena, player, boss) = create_test_arena();
        let effects = StatusEffects::default();

        let outcome = arena.apply_damage(
            &effects,
            TargetRef::Player(player),
            TargetRef::Boss(boss),
            "Cleave",
            50.0,
        );
        assert_eq!(outcome.dealt, 50.0);
        assert_eq!(arena.player(player).map(|p| p.combatant.damage_dealt), Some(50.0));
        assert_eq!(arena.log.filter_by_type(CombatLogEventType::Damage).len(), 1);
    }

    #[test]
    fn test_death_leaves_tombstone_and_revive_consumes_it() {
        let (mut arena, player, boss) = create_test_arena();
        let effects = StatusEffects::default();

        arena.apply_damage(
            &effects,
            TargetRef::Boss(boss),
            TargetRef::Player(player),
            "Fel Beam",
            1000.0,
        );
        arena.sweep_player_deaths(&effects);
        arena.sweep_player_deaths(&effects);
        assert_eq!(arena.tombstones.len(), 1, "one tombstone per death");

        arena.revive_requests.push(ReviveRequest {
            player_id: player,
            heal_percent: 0.5,
        });
        assert_eq!(arena.process_revive_requests(&effects), 1);
        let revived = arena.player(player).expect("player exists");
        assert!(revived.is_alive());
        assert_eq!(revived.combatant.hp, revived.combatant.max_hp * 0.5);
        assert!(arena.tombstones.is_empty());
    }

    #[test]
    fn test_healing_spawns_pulse() {
        let (mut arena, player, _) = create_test_arena();
        let effects = StatusEffects::default();
        if let Some(p) = arena.player_mut(player) {
            p.combatant.hp = 100.0;
        }
        let healed = arena.apply_healing(
            &effects,
            TargetRef::Player(player),
            TargetRef::Player(player),
            "Test Heal",
            30.0,
        );
        assert_eq!(healed, 30.0);
        assert_eq!(arena.heal_pulses.len(), 1);
    }

    #[test]
    fn test_unknown_targets_are_ignored() {
        let (mut arena, player, _) = create_test_arena();
        let effects = StatusEffects::default();
        let outcome = arena.apply_damage(
            &effects,
            TargetRef::Player(player),
            TargetRef::Enemy(UnitId(99)),
            "Cleave",
            10.0,
        );
        assert_eq!(outcome, DamageOutcome::default());
    }
}
