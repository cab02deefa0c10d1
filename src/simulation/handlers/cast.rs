//! Cast handler
//!
//! Charge-up state machine: `start_cast` immobilizes the caster, `update_cast`
//! watches for completion or interruption, and `complete_cast` restores
//! movement and hands the payload back to a [`PayloadRouter`].
//!
//! Any drift of more than one unit in either axis from the starting position
//! interrupts the cast.

use bevy::prelude::*;

use crate::combat::log::CombatLogEventType;
use crate::simulation::arena::{Arena, CastState};
use crate::simulation::combatant::{ModifierSource, PlayerId, SpeedModifier, TargetRef};
use crate::simulation::constants::CAST_MOVE_TOLERANCE;
use crate::simulation::input::SkillInput;
use crate::simulation::skill_config::{CastSkill, SkillKind};

/// Executes a cast's payload through the normal per-archetype routing.
pub trait PayloadRouter {
    fn route_payload(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill_name: &str,
        payload: &SkillKind,
        input: &SkillInput,
        depth: u8,
    ) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct CastHandler;

impl CastHandler {
    /// Begin charging. Fails when the player is dead or already casting.
    /// `depth` is the payload nesting level the cast was started at.
    #[allow(clippy::too_many_arguments)]
    pub fn start_cast(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        slot: Option<usize>,
        skill_name: &str,
        skill: &CastSkill,
        input: &SkillInput,
        depth: u8,
    ) -> bool {
        let now = arena.now;
        let Some(player) = arena.player_mut(player_id) else {
            return false;
        };
        if !player.is_alive() || player.is_casting() {
            return false;
        }

        player.cast_state = Some(CastState {
            slot,
            skill_name: skill_name.to_string(),
            active: true,
            start_time: now,
            cast_time: skill.cast_time.max(0.0),
            skill: skill.clone(),
            input: *input,
            origin: player.combatant.position,
            channeled: skill.channeled,
            depth,
        });
        player
            .combatant
            .modifiers
            .push(ModifierSource::Cast, SpeedModifier::Immobilize);
        player.combatant.recompute_stats();

        let message = format!(
            "{} begins {} {}",
            player.combatant.name,
            if skill.channeled { "channeling" } else { "casting" },
            skill_name
        );
        arena.log.log(CombatLogEventType::AbilityUsed, message);
        true
    }

    /// Returns true when the active cast has finished charging. Interrupts
    /// (and returns false) when the caster moved.
    pub fn update_cast(&self, arena: &mut Arena, player_id: PlayerId) -> bool {
        let now = arena.now;
        let Some(player) = arena.player(player_id) else {
            return false;
        };
        let Some(cast) = player.cast_state.as_ref().filter(|c| c.active) else {
            return false;
        };

        let drift = (player.position() - cast.origin).abs();
        if drift.x > CAST_MOVE_TOLERANCE || drift.y > CAST_MOVE_TOLERANCE {
            self.cancel_cast(arena, player_id);
            return false;
        }

        now - cast.start_time >= cast.cast_time
    }

    /// Finish the active cast and execute its payload. A cast without a
    /// payload completes successfully on its own.
    pub fn complete_cast(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        router: &impl PayloadRouter,
    ) -> bool {
        let Some(cast) = self.clear_cast(arena, player_id) else {
            return false;
        };

        let Some(payload) = cast.skill.payload.as_deref() else {
            debug!("{} completed with no payload", cast.skill_name);
            return true;
        };

        router.route_payload(
            arena,
            player_id,
            &cast.skill_name,
            payload,
            &cast.input,
            cast.depth.saturating_add(1),
        )
    }

    /// Abort the active cast without executing it.
    pub fn cancel_cast(&self, arena: &mut Arena, player_id: PlayerId) -> bool {
        let Some(cast) = self.clear_cast(arena, player_id) else {
            return false;
        };
        let name = arena.display_name(TargetRef::Player(player_id));
        arena.log.log(
            CombatLogEventType::AbilityUsed,
            format!("{}'s {} was interrupted", name, cast.skill_name),
        );
        true
    }

    /// Fraction of the active cast completed, in [0, 1]. Zero when not casting.
    pub fn cast_progress(&self, arena: &Arena, player_id: PlayerId) -> f32 {
        let Some(cast) = arena
            .player(player_id)
            .and_then(|p| p.cast_state.as_ref())
            .filter(|c| c.active)
        else {
            return 0.0;
        };
        if cast.cast_time <= 0.0 {
            return 1.0;
        }
        ((arena.now - cast.start_time) / cast.cast_time).clamp(0.0, 1.0) as f32
    }

    fn clear_cast(&self, arena: &mut Arena, player_id: PlayerId) -> Option<CastState> {
        let player = arena.player_mut(player_id)?;
        let cast = player.cast_state.take().filter(|c| c.active)?;
        player.combatant.modifiers.remove(ModifierSource::Cast);
        player.combatant.recompute_stats();
        Some(cast)
    }
}
