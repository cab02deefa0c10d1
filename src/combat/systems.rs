//! Combat systems
//!
//! ECS systems that feed inputs into the [`Arena`], advance it with
//! [`tick::step`] and publish what came out.

use bevy::prelude::*;

use crate::simulation::arena::Arena;
use crate::simulation::dispatcher::SkillDispatcher;
use crate::simulation::tick;

use super::events::*;
use super::SimulationSpeed;

/// Store each player's latest movement direction
pub fn process_movement_input(
    mut movement_events: EventReader<MovementInputEvent>,
    mut arena: ResMut<Arena>,
) {
    for event in movement_events.read() {
        if !event.direction.is_finite() {
            continue;
        }
        if let Some(player) = arena.player_mut(event.player_id) {
            player.move_input = event.direction;
        }
    }
}

/// Dispatch skill presses in arrival order
pub fn process_skill_input(
    mut skill_events: EventReader<SkillInputEvent>,
    mut arena: ResMut<Arena>,
    dispatcher: Res<SkillDispatcher>,
) {
    for event in skill_events.read() {
        let executed = dispatcher.handle_skill(&mut arena, event.player_id, event.slot, &event.input);
        if !executed {
            debug!(
                "Skill slot {} rejected for player {:?}",
                event.slot, event.player_id
            );
        }
    }
}

/// Run one simulation tick scaled by the simulation speed
pub fn advance_simulation(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut arena: ResMut<Arena>,
    dispatcher: Res<SkillDispatcher>,
) {
    if speed.is_paused() {
        return;
    }
    let dt_ms = time.delta_secs_f64() * 1000.0 * speed.multiplier as f64;
    if dt_ms <= 0.0 {
        return;
    }
    tick::step(&mut arena, &dispatcher, dt_ms);
}

/// Drain the arena's cooldown outbox into events
pub fn publish_cooldown_notices(
    mut arena: ResMut<Arena>,
    mut cooldown_events: EventWriter<CooldownEvent>,
) {
    for notice in arena.cooldown_notices.drain(..) {
        cooldown_events.send(CooldownEvent { notice });
    }
}
