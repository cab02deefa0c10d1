//! Command-line interface for the boss arena simulator

use clap::Parser;
use std::path::PathBuf;

/// Cooperative boss arena ability simulator
#[derive(Parser, Debug)]
#[command(name = "bossarena")]
#[command(about = "Cooperative boss arena ability simulator")]
#[command(version)]
pub struct Args {
    /// Match config JSON; without it a default four-player party is used
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Skill database RON to load instead of assets/config/skills.ron
    #[arg(long, value_name = "SKILLS_FILE")]
    pub skills: Option<PathBuf>,

    /// Output path for match log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum match duration in seconds (overrides the config)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for a reproducible match (overrides the config)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
