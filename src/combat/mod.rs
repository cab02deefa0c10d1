//! Combat system
//!
//! Wires the ability simulation into a Bevy app:
//! - input events (movement, skill presses)
//! - the fixed per-frame tick
//! - cooldown notifications
//! - combat logging

use bevy::prelude::*;

pub mod events;
pub mod log;
pub mod systems;

use crate::simulation::arena::Arena;
use crate::simulation::dispatcher::SkillDispatcher;
use crate::simulation::skill_config::{load_skill_database, SkillDatabase};

use events::*;
use systems::*;

/// System set labels for combat system ordering.
///
/// Use these to order systems that feed input or read results.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSystemPhase {
    /// Movement and skill input
    Input,
    /// The simulation tick
    Simulation,
    /// Outbox draining
    Output,
}

/// Plugin for the combat system
///
/// Inserts a [`SkillDispatcher`] loaded from `assets/config/skills.ron` unless
/// one is already present.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SkillDispatcher>() {
            let database = match load_skill_database() {
                Ok(database) => database,
                Err(e) => {
                    warn!("{}; falling back to built-in skill database", e);
                    match SkillDatabase::builtin() {
                        Ok(database) => database,
                        Err(e) => panic!("Failed to load skill database: {}", e),
                    }
                }
            };
            app.insert_resource(SkillDispatcher::new(database));
        }

        app
            // Combat events
            .add_event::<SkillInputEvent>()
            .add_event::<MovementInputEvent>()
            .add_event::<CooldownEvent>()
            // Resources
            .init_resource::<Arena>()
            .init_resource::<SimulationSpeed>()
            // Systems
            .configure_sets(
                Update,
                (
                    CombatSystemPhase::Input,
                    CombatSystemPhase::Simulation,
                    CombatSystemPhase::Output,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (process_movement_input, process_skill_input)
                    .chain()
                    .in_set(CombatSystemPhase::Input),
            )
            .add_systems(Update, advance_simulation.in_set(CombatSystemPhase::Simulation))
            .add_systems(Update, publish_cooldown_notices.in_set(CombatSystemPhase::Output));
    }
}

/// Controls the speed of the combat simulation
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 1.0 = normal, 2.0 = double)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }
}
