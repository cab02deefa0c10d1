//! Status effect system
//!
//! Applies buffs and debuffs to combatants, expires them, and routes all hp
//! changes through a single damage path and a single healing path.
//!
//! Damage order: buff damage reduction, then temporary shield, then hp.

use super::combatant::{ActiveEffect, Combatant, EffectKind};
use super::constants::{DEFAULT_BUFF_DURATION, DEFAULT_DEBUFF_DURATION};
use super::skill_config::EffectParams;

/// Result of routing damage through [`StatusEffects::apply_damage`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    /// Damage that reached hp
    pub dealt: f32,
    /// Damage soaked by the temporary shield
    pub absorbed: f32,
    /// Damage prevented by damage reduction
    pub mitigated: f32,
    /// This hit took the target from alive to dead
    pub killed: bool,
}

/// Buff/debuff service owned by the skill dispatcher.
#[derive(Clone, Debug)]
pub struct StatusEffects {
    pub default_buff_duration: f64,
    pub default_debuff_duration: f64,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            default_buff_duration: DEFAULT_BUFF_DURATION,
            default_debuff_duration: DEFAULT_DEBUFF_DURATION,
        }
    }
}

impl StatusEffects {
    pub fn apply_buff(&self, target: &mut Combatant, params: &EffectParams, now: f64) -> u64 {
        let duration = params.duration.unwrap_or(self.default_buff_duration);
        self.apply(target, EffectKind::Buff, params, duration, now)
    }

    pub fn apply_debuff(&self, target: &mut Combatant, params: &EffectParams, now: f64) -> u64 {
        let duration = params.duration.unwrap_or(self.default_debuff_duration);
        self.apply(target, EffectKind::Debuff, params, duration, now)
    }

    /// Toggle a permanent buff by name. Returns true when it was switched on.
    pub fn toggle_buff(&self, target: &mut Combatant, params: &EffectParams, now: f64) -> bool {
        let name = effect_name(params, EffectKind::Buff);
        let existing = target
            .active_effects
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.id);

        match existing {
            Some(id) => {
                self.remove_effect(target, id);
                false
            }
            None => {
                self.apply(target, EffectKind::Buff, params, f64::INFINITY, now);
                true
            }
        }
    }

    fn apply(
        &self,
        target: &mut Combatant,
        kind: EffectKind,
        params: &EffectParams,
        duration: f64,
        now: f64,
    ) -> u64 {
        target.capture_original_stats();

        let id = target.allocate_effect_id();
        target.active_effects.push(ActiveEffect {
            id,
            kind,
            name: effect_name(params, kind),
            start_time: now,
            duration,
            params: params.clone(),
        });

        if let Some(shield) = params.shield {
            target.temp_shield += shield.max(0.0);
        }

        target.recompute_stats();
        id
    }

    /// Remove every effect whose duration has elapsed, returning the removed entries.
    pub fn update_effects(&self, target: &mut Combatant, now: f64) -> Vec<ActiveEffect> {
        let (expired, remaining): (Vec<_>, Vec<_>) = target
            .active_effects
            .drain(..)
            .partition(|e| e.is_expired(now));
        target.active_effects = remaining;

        if !expired.is_empty() {
            self.after_removal(target, &expired);
        }
        expired
    }

    /// Remove one effect by id. Stats are recomputed from the baseline and
    /// every effect still active.
    pub fn remove_effect(&self, target: &mut Combatant, id: u64) -> Option<ActiveEffect> {
        let index = target.active_effects.iter().position(|e| e.id == id)?;
        let removed = target.active_effects.remove(index);
        self.after_removal(target, std::slice::from_ref(&removed));
        Some(removed)
    }

    /// Drop every effect and restore the pre-effect stats.
    pub fn clear_all_effects(&self, target: &mut Combatant) {
        let had_shield = target.active_effects.iter().any(|e| e.params.shield.is_some());
        target.active_effects.clear();
        if had_shield {
            target.temp_shield = 0.0;
        }
        target.recompute_stats();
        target.original_stats = None;
    }

    fn after_removal(&self, target: &mut Combatant, removed: &[ActiveEffect]) {
        let removed_shield = removed.iter().any(|e| e.params.shield.is_some());
        let shield_left = target.active_effects.iter().any(|e| e.params.shield.is_some());
        if removed_shield && !shield_left {
            target.temp_shield = 0.0;
        }
        target.recompute_stats();
    }

    /// Route damage through reduction, shield and hp.
    pub fn apply_damage(&self, target: &mut Combatant, amount: f32) -> DamageOutcome {
        debug_assert!(
            amount >= 0.0 || amount.is_nan(),
            "apply_damage: damage cannot be negative, got {}",
            amount
        );
        if !target.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::default();
        }

        let reduced = amount * target.incoming_damage_factor();
        let mitigated = amount - reduced;

        let absorbed = reduced.min(target.temp_shield);
        target.temp_shield -= absorbed;

        let dealt = (reduced - absorbed).min(target.hp);
        target.hp = (target.hp - dealt).max(0.0);
        target.damage_taken += dealt;

        let outcome = DamageOutcome {
            dealt,
            absorbed,
            mitigated,
            killed: !target.is_alive(),
        };
        target.debug_validate();
        outcome
    }

    /// Heal up to max hp. The dead cannot be healed. Returns the hp restored.
    pub fn apply_healing(&self, target: &mut Combatant, amount: f32) -> f32 {
        if !target.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let healed = amount.min(target.max_hp - target.hp).max(0.0);
        target.hp += healed;
        target.debug_validate();
        healed
    }
}

fn effect_name(params: &EffectParams, kind: EffectKind) -> String {
    params.name.clone().unwrap_or_else(|| match kind {
        EffectKind::Buff => "Buff".to_string(),
        EffectKind::Debuff => "Debuff".to_string(),
    })
}
