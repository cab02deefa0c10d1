//! Ability simulation
//!
//! Pure game logic for the boss arena: geometry, combatants and their status
//! effects, ability entities, the per-archetype skill handlers, the skill
//! dispatcher, hostile AI and the per-tick pipeline. Nothing in here touches
//! rendering; Bevy is used for math types, `Resource` derives and logging.

pub mod ai;
pub mod arena;
pub mod combatant;
pub mod constants;
pub mod dispatcher;
pub mod entities;
pub mod geometry;
pub mod handlers;
pub mod input;
pub mod skill_config;
pub mod status_effects;
pub mod tick;

pub use arena::{Arena, CooldownNotice, Player};
pub use combatant::{Combatant, PlayerId, TargetRef, UnitId};
pub use dispatcher::SkillDispatcher;
pub use input::{RawSkillInput, SkillAction, SkillInput};
pub use skill_config::{
    load_skill_database, load_skill_database_from, PlayerClass, SkillConfig, SkillDatabase,
    SkillKind,
};
pub use status_effects::StatusEffects;
