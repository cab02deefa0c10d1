//! Combat events
//!
//! Inputs into the simulation and notifications coming out of it.

use bevy::prelude::*;

use crate::simulation::arena::CooldownNotice;
use crate::simulation::combatant::PlayerId;
use crate::simulation::input::RawSkillInput;

/// A skill press from a player's client (or a bot).
#[derive(Event, Clone, Debug)]
pub struct SkillInputEvent {
    pub player_id: PlayerId,
    /// Skill slot, 0..4
    pub slot: usize,
    pub input: RawSkillInput,
}

/// Desired movement direction. A zero vector stops the player.
#[derive(Event, Clone, Copy, Debug)]
pub struct MovementInputEvent {
    pub player_id: PlayerId,
    pub direction: Vec2,
}

/// Fired after a skill executes and its cooldown is committed.
#[derive(Event, Clone, Copy, Debug)]
pub struct CooldownEvent {
    pub notice: CooldownNotice,
}
