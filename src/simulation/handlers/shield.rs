//! Shield handler
//!
//! A raised shield blocks hostile projectiles arriving within `arc / 2` of its
//! facing, halves the holder's movement speed, and drops after its duration.

use bevy::prelude::*;

use crate::combat::log::CombatLogEventType;
use crate::simulation::arena::{Arena, Player, ShieldState};
use crate::simulation::combatant::{ModifierSource, PlayerId, SpeedModifier};
use crate::simulation::constants::SHIELD_MOVE_MULTIPLIER;
use crate::simulation::geometry;
use crate::simulation::skill_config::ShieldSkill;

#[derive(Clone, Debug)]
pub struct ShieldHandler {
    /// Movement multiplier applied while the shield is up
    pub move_multiplier: f32,
}

impl Default for ShieldHandler {
    fn default() -> Self {
        Self {
            move_multiplier: SHIELD_MOVE_MULTIPLIER,
        }
    }
}

impl ShieldHandler {
    /// Raise the shield facing `direction`.
    pub fn activate(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        slot: Option<usize>,
        skill: &ShieldSkill,
        direction: Vec2,
    ) -> bool {
        let now = arena.now;
        let Some(player) = arena.player_mut(player_id).filter(|p| p.is_alive()) else {
            return false;
        };

        player.shield_state = Some(ShieldState {
            slot,
            active: true,
            start_time: now,
            duration: skill.duration,
            arc: skill.arc,
            angle: geometry::vector_angle(direction),
        });
        player.combatant.modifiers.push(
            ModifierSource::Shield,
            SpeedModifier::Multiply(self.move_multiplier),
        );
        player.combatant.recompute_stats();

        let message = format!("{} raises a shield", player.combatant.name);
        arena.log.log(CombatLogEventType::AuraApplied, message);
        true
    }

    /// Whether the player's shield blocks a projectile at `projectile_position`.
    pub fn is_blocked(&self, player: &Player, projectile_position: Vec2) -> bool {
        match player.shield_state.as_ref().filter(|s| s.active) {
            Some(shield) => geometry::in_arc(
                player.position(),
                shield.angle,
                projectile_position,
                shield.arc,
            ),
            None => false,
        }
    }

    /// Expire the shield once its duration has elapsed. Returns true while
    /// the shield is still up.
    pub fn update(&self, arena: &mut Arena, player_id: PlayerId) -> bool {
        let now = arena.now;
        let expired = match arena
            .player(player_id)
            .and_then(|p| p.shield_state.as_ref())
            .filter(|s| s.active)
        {
            Some(shield) => now - shield.start_time >= shield.duration,
            None => return false,
        };

        if expired {
            self.deactivate(arena, player_id);
            return false;
        }
        true
    }

    /// Re-aim an active shield. Ignored when no shield is up.
    pub fn update_angle(&self, arena: &mut Arena, player_id: PlayerId, direction: Vec2) -> bool {
        let Some(shield) = arena
            .player_mut(player_id)
            .and_then(|p| p.shield_state.as_mut())
            .filter(|s| s.active)
        else {
            return false;
        };
        shield.angle = geometry::vector_angle(direction);
        true
    }

    /// Lower the shield and restore movement.
    pub fn deactivate(&self, arena: &mut Arena, player_id: PlayerId) -> bool {
        let Some(player) = arena.player_mut(player_id) else {
            return false;
        };
        let was_active = player.shield_state.take().is_some_and(|s| s.active);
        if player.combatant.modifiers.remove(ModifierSource::Shield) {
            player.combatant.recompute_stats();
        }
        if was_active {
            let message = format!("{}'s shield fades", player.combatant.name);
            arena.log.log(CombatLogEventType::AuraRemoved, message);
        }
        was_active
    }
}
