//! Boss arena simulator
//!
//! Runs a headless boss fight with bot-driven players and writes the combat
//! log as JSON.

use std::process::ExitCode;

use bossarena::cli::{parse_args, Args};
use bossarena::headless::{run_headless_match, HeadlessMatchConfig};

fn build_config(args: &Args) -> Result<HeadlessMatchConfig, String> {
    let mut config = match &args.headless {
        Some(path) => HeadlessMatchConfig::load_from_file(path)?,
        None => HeadlessMatchConfig::default(),
    };
    if let Some(skills) = &args.skills {
        config.skills_path = Some(skills.display().to_string());
    }
    if let Some(output) = &args.output {
        config.output_path = Some(output.display().to_string());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let args = parse_args();

    let result = build_config(&args).and_then(|config| run_headless_match(config, true));
    match result {
        Ok(result) => {
            println!(
                "{} after {:.1}s (boss hp {:.0})",
                result.outcome.name(),
                result.match_time,
                result.boss_final_health
            );
            for player in &result.players {
                println!(
                    "  {:<12} {:>6.0}/{:<6.0} dealt {:>7.0} taken {:>7.0} healed {:>7.0}",
                    player.name,
                    player.final_health,
                    player.max_health,
                    player.damage_dealt,
                    player.damage_taken,
                    player.healing_done
                );
            }
            if let Some(path) = &result.log_path {
                println!("Log saved to: {}", path);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Headless match failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
