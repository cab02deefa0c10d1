//! Boss Arena - cooperative boss fight ability engine
//!
//! Up to four players fight a boss (and optional adds) in a bounded 2D arena.
//! Skill presses go through the skill dispatcher, which routes each skill to
//! its archetype handler; the per-tick pipeline advances state machines,
//! ability entities and collisions.
//!
//! This library exposes the simulation, its Bevy plugin and the headless
//! runner for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;
pub mod simulation;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::CombatPlugin;
pub use headless::HeadlessMatchConfig;
pub use simulation::{Arena, SkillDatabase, SkillDispatcher};
