//! Per-archetype skill handlers
//!
//! Each handler is a small service owned by the
//! [`SkillDispatcher`](crate::simulation::dispatcher::SkillDispatcher) and
//! operates on the [`Arena`](crate::simulation::arena::Arena) it is given.

pub mod aoe;
pub mod cast;
pub mod dash;
pub mod melee;
pub mod shield;

pub use aoe::AoeHandler;
pub use cast::{CastHandler, PayloadRouter};
pub use dash::DashHandler;
pub use melee::MeleeHandler;
pub use shield::ShieldHandler;
