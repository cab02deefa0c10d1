//! Integration tests for headless match execution
//!
//! These tests verify that:
//! - Headless configs are validated before a match starts
//! - Headless matches run to completion and write their log
//! - Seeded RNG produces deterministic results

use bossarena::headless::{run_headless_match, HeadlessMatchConfig, MatchOutcome};

/// Helper to create a short match config writing into the temp dir
fn create_config(party: Vec<&str>, seed: Option<u64>, log_name: &str) -> HeadlessMatchConfig {
    let output = std::env::temp_dir()
        .join(format!("bossarena_headless_{}_{}.json", log_name, std::process::id()));
    HeadlessMatchConfig {
        party: party.into_iter().map(String::from).collect(),
        enemies: 0,
        max_duration_secs: 5.0, // Short duration for tests
        random_seed: seed,
        output_path: Some(output.display().to_string()),
        skills_path: None,
        tick_rate_hz: 60.0,
    }
}

#[test]
fn test_config_with_seed() {
    let config = create_config(vec!["Warrior", "Priest"], Some(42), "seed");

    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.party.len(), 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_config_is_rejected_before_running() {
    let mut config = create_config(vec![], Some(1), "empty");
    assert!(run_headless_match(config.clone(), false).is_err(), "Empty party");

    config.party = vec!["Warrior".to_string()];
    config.max_duration_secs = 0.0;
    assert!(run_headless_match(config.clone(), false).is_err(), "Zero duration");

    config.max_duration_secs = 5.0;
    config.enemies = 20;
    assert!(run_headless_match(config, false).is_err(), "Too many adds");
}

#[test]
fn test_json_config_parses() {
    let json = r#"{
        "party": ["Warrior", "Priest", "Mage", "Hunter"],
        "enemies": 2,
        "max_duration_secs": 120,
        "random_seed": 7
    }"#;
    let config: HeadlessMatchConfig = serde_json::from_str(json).expect("valid config JSON");

    assert_eq!(config.enemies, 2);
    assert_eq!(config.max_duration_secs, 120.0);
    assert_eq!(config.random_seed, Some(7));
    assert!(config.output_path.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_short_match_times_out_and_saves_log() {
    let config = create_config(vec!["Warrior", "Priest", "Mage", "Hunter"], Some(12345), "timeout");
    let output = config.output_path.clone().unwrap();

    let result = run_headless_match(config, false).expect("match should run");

    assert_eq!(result.outcome, MatchOutcome::Timeout, "5 seconds is not enough to kill the boss");
    assert!(result.match_time >= 5.0);
    assert_eq!(result.players.len(), 4);
    assert!(result.boss_final_health < 5000.0, "The party should have damaged the boss");
    assert_eq!(result.random_seed, Some(12345));
    assert_eq!(result.log_path.as_deref(), Some(output.as_str()));

    let contents = std::fs::read_to_string(&output).expect("log file should exist");
    let value: serde_json::Value = serde_json::from_str(&contents).expect("log should be JSON");
    assert_eq!(value["metadata"]["outcome"], "Timeout");
    let _ = std::fs::remove_file(&output);
}

#[test]
fn test_seeded_matches_are_deterministic() {
    let first = run_headless_match(create_config(vec!["Rogue", "Shaman"], Some(99), "det_a"), false)
        .expect("first match should run");
    let second = run_headless_match(create_config(vec!["Rogue", "Shaman"], Some(99), "det_b"), false)
        .expect("second match should run");

    assert_eq!(first.boss_final_health, second.boss_final_health);
    for (a, b) in first.players.iter().zip(&second.players) {
        assert_eq!(a.damage_dealt, b.damage_dealt, "{} damage differs", a.name);
        assert_eq!(a.final_health, b.final_health, "{} health differs", a.name);
    }

    for result in [&first, &second] {
        if let Some(path) = &result.log_path {
            let _ = std::fs::remove_file(path);
        }
    }
}
