//! Headless mode for automated runs
//!
//! Runs a boss fight without any graphical output, with bots driving the
//! party, suitable for automated testing and balance checks.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless match
//! cargo run --release -- --headless match_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "party": ["Warrior", "Priest", "Mage", "Hunter"],
//!   "enemies": 2,
//!   "max_duration_secs": 120,
//!   "random_seed": 7
//! }
//! ```

pub mod bots;
pub mod config;
pub mod runner;

pub use config::HeadlessMatchConfig;
pub use runner::{run_headless_match, MatchOutcome, MatchResult};
