//! Combatant state shared by players, bosses and enemies
//!
//! A [`Combatant`] is anything ability entities can hit. Its live stats are
//! always derived from a canonical baseline:
//! - `speed = baseline.speed * product(effect speed multipliers) * modifier stack`
//!   (zero while rooted or immobilized)
//! - `max_hp = baseline.max_hp * product(effect max hp multipliers)`
//! - `armor = baseline.armor + sum(effect armor bonuses)`
//!
//! [`Combatant::recompute_stats`] is the only place live stats are written, so
//! removing any one contributor restores exactly the composition of the rest.

use bevy::math::Vec2;
use smallvec::SmallVec;

use super::skill_config::EffectParams;

// ============================================================================
// Identity
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

/// Reference to anything that owns ability entities or can be targeted by them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Player(PlayerId),
    Boss(UnitId),
    Enemy(UnitId),
}

impl TargetRef {
    /// Boss and enemies are hostile to players.
    pub fn is_hostile(&self) -> bool {
        !matches!(self, TargetRef::Player(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatantKind {
    Player,
    Boss,
    Enemy,
}

impl CombatantKind {
    pub fn is_hostile(&self) -> bool {
        !matches!(self, CombatantKind::Player)
    }
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseStats {
    pub max_hp: f32,
    pub speed: f32,
    pub armor: f32,
}

/// Non-effect contributors to movement speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierSource {
    Cast,
    Shield,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpeedModifier {
    Multiply(f32),
    Immobilize,
}

/// Speed modifiers keyed by source; at most one entry per source.
#[derive(Clone, Debug, Default)]
pub struct ModifierStack {
    entries: SmallVec<[(ModifierSource, SpeedModifier); 2]>,
}

impl ModifierStack {
    /// Add or replace the modifier for `source`.
    pub fn push(&mut self, source: ModifierSource, modifier: SpeedModifier) {
        self.remove(source);
        self.entries.push((source, modifier));
    }

    /// Remove the modifier for `source`, returning whether one existed.
    pub fn remove(&mut self, source: ModifierSource) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(s, _)| *s != source);
        self.entries.len() != before
    }

    pub fn contains(&self, source: ModifierSource) -> bool {
        self.entries.iter().any(|(s, _)| *s == source)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn multiplier(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, m)| match m {
                SpeedModifier::Multiply(factor) => *factor,
                SpeedModifier::Immobilize => 1.0,
            })
            .product()
    }

    pub fn immobilized(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, m)| matches!(m, SpeedModifier::Immobilize))
    }
}

// ============================================================================
// Effects
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    Buff,
    Debuff,
}

/// A buff or debuff currently applied to a combatant.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEffect {
    pub id: u64,
    pub kind: EffectKind,
    pub name: String,
    /// Application time in ms
    pub start_time: f64,
    /// Duration in ms (`f64::INFINITY` for toggles)
    pub duration: f64,
    pub params: EffectParams,
}

impl ActiveEffect {
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start_time >= self.duration
    }

    pub fn remaining(&self, now: f64) -> f64 {
        (self.duration - (now - self.start_time)).max(0.0)
    }
}

// ============================================================================
// Combatant
// ============================================================================

#[derive(Clone, Debug)]
pub struct Combatant {
    pub kind: CombatantKind,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Live movement speed in px/s
    pub speed: f32,
    pub armor: f32,
    /// Damage absorbed before hp
    pub temp_shield: f32,
    pub is_rooted: bool,
    pub is_stunned: bool,
    pub active_effects: Vec<ActiveEffect>,
    /// Canonical stats the combatant was created with
    pub base_stats: BaseStats,
    /// Snapshot taken on the first effect application, cleared when effects are cleared
    pub original_stats: Option<BaseStats>,
    pub modifiers: ModifierStack,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
    next_effect_id: u64,
}

impl Combatant {
    pub fn new(
        kind: CombatantKind,
        name: impl Into<String>,
        position: Vec2,
        radius: f32,
        max_hp: f32,
        speed: f32,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
            radius,
            hp: max_hp,
            max_hp,
            speed,
            armor: 0.0,
            temp_shield: 0.0,
            is_rooted: false,
            is_stunned: false,
            active_effects: Vec::new(),
            base_stats: BaseStats {
                max_hp,
                speed,
                armor: 0.0,
            },
            original_stats: None,
            modifiers: ModifierStack::default(),
            damage_dealt: 0.0,
            damage_taken: 0.0,
            healing_done: 0.0,
            next_effect_id: 1,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Stats effects are computed from.
    pub fn baseline(&self) -> BaseStats {
        self.original_stats.unwrap_or(self.base_stats)
    }

    /// Take the pre-effect snapshot if none exists yet.
    pub fn capture_original_stats(&mut self) {
        if self.original_stats.is_none() {
            self.original_stats = Some(self.base_stats);
        }
    }

    pub(crate) fn allocate_effect_id(&mut self) -> u64 {
        let id = self.next_effect_id;
        self.next_effect_id += 1;
        id
    }

    pub fn has_effect_named(&self, name: &str) -> bool {
        self.active_effects.iter().any(|e| e.name == name)
    }

    /// Derive every live stat from the baseline, effects and modifier stack.
    pub fn recompute_stats(&mut self) {
        let baseline = self.baseline();

        let mut speed = baseline.speed;
        let mut max_hp = baseline.max_hp;
        let mut armor = baseline.armor;
        let mut rooted = false;
        let mut stunned = false;

        for effect in &self.active_effects {
            let params = &effect.params;
            if let Some(m) = params.speed_multiplier {
                speed *= m;
            }
            if let Some(m) = params.max_hp_multiplier {
                max_hp *= m;
            }
            if let Some(bonus) = params.armor_bonus {
                armor += bonus;
            }
            rooted |= params.rooted;
            stunned |= params.stunned;
        }

        speed *= self.modifiers.multiplier();
        if rooted || stunned || self.modifiers.immobilized() {
            speed = 0.0;
        }

        self.speed = speed.max(0.0);
        self.max_hp = max_hp.max(0.0);
        self.hp = self.hp.min(self.max_hp);
        self.armor = armor;
        self.is_rooted = rooted;
        self.is_stunned = stunned;

        self.debug_validate();
    }

    /// Product of outgoing damage multipliers from active effects.
    pub fn outgoing_damage_multiplier(&self) -> f32 {
        self.active_effects
            .iter()
            .filter_map(|e| e.params.damage_multiplier)
            .product()
    }

    /// Fraction of incoming damage that gets through buffs' damage reduction.
    pub fn incoming_damage_factor(&self) -> f32 {
        self.active_effects
            .iter()
            .filter(|e| e.kind == EffectKind::Buff)
            .filter_map(|e| e.params.damage_reduction)
            .map(|r| 1.0 - r.clamp(0.0, 1.0))
            .product()
    }

    /// Whether movement input can move this combatant.
    pub fn can_move(&self) -> bool {
        self.is_alive() && !self.is_stunned && self.speed > 0.0
    }

    /// Validate hp and shield invariants (debug builds only).
    #[inline]
    pub fn debug_validate(&self) {
        debug_assert!(
            self.hp >= 0.0 && self.hp <= self.max_hp + f32::EPSILON,
            "{}: hp {} outside [0, {}]",
            self.name,
            self.hp,
            self.max_hp
        );
        debug_assert!(
            self.temp_shield >= 0.0,
            "{}: negative temp shield {}",
            self.name,
            self.temp_shield
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_combatant() -> Combatant {
        Combatant::new(CombatantKind::Player, "Tester", Vec2::ZERO, 20.0, 100.0, 150.0)
    }

    #[test]
    fn test_modifier_stack_replaces_same_source() {
        let mut stack = ModifierStack::default();
        stack.push(ModifierSource::Shield, SpeedModifier::Multiply(0.5));
        stack.push(ModifierSource::Shield, SpeedModifier::Multiply(0.25));
        assert!((stack.multiplier() - 0.25).abs() < 1e-6);
        assert!(stack.contains(ModifierSource::Shield));
        assert!(!stack.contains(ModifierSource::Cast));
        assert!(stack.remove(ModifierSource::Shield));
        assert!(!stack.contains(ModifierSource::Shield));
        assert!(stack.is_empty());
        assert!(!stack.remove(ModifierSource::Shield));
    }

    #[test]
    fn test_recompute_with_modifiers() {
        let mut c = create_test_combatant();
        c.modifiers.push(ModifierSource::Shield, SpeedModifier::Multiply(0.5));
        c.recompute_stats();
        assert_eq!(c.speed, 75.0);

        c.modifiers.push(ModifierSource::Cast, SpeedModifier::Immobilize);
        c.recompute_stats();
        assert_eq!(c.speed, 0.0);

        c.modifiers.remove(ModifierSource::Cast);
        c.modifiers.remove(ModifierSource::Shield);
        c.recompute_stats();
        assert_eq!(c.speed, 150.0, "removing every modifier restores base speed");
    }

    #[test]
    fn test_hp_fraction_handles_zero_max() {
        let mut c = create_test_combatant();
        c.hp = 0.0;
        c.max_hp = 0.0;
        assert_eq!(c.hp_fraction(), 0.0);
    }

    #[test]
    fn test_target_ref_hostility() {
        assert!(!TargetRef::Player(PlayerId(1)).is_hostile());
        assert!(TargetRef::Boss(UnitId(1)).is_hostile());
        assert!(TargetRef::Enemy(UnitId(2)).is_hostile());
    }
}
