//! Unit tests for combat log query and aggregation methods
//!
//! These tests verify that the CombatLog correctly:
//! - Aggregates damage and healing by source and ability
//! - Counts killing blows and records deaths and revives
//! - Exports metadata and entries as JSON

use bossarena::combat::log::{
    CombatLog, CombatLogEventType, CombatantMetadata, MatchMetadata, StructuredEventData,
};

fn create_test_log() -> CombatLog {
    CombatLog::default()
}

fn hit(log: &mut CombatLog, source: &str, target: &str, ability: &str, amount: f32, killing: bool) {
    log.log_damage(
        source.to_string(),
        target.to_string(),
        ability.to_string(),
        amount,
        killing,
        "Test message".to_string(),
    );
}

fn create_metadata() -> MatchMetadata {
    MatchMetadata {
        boss_name: "Illidan Stormrage".to_string(),
        outcome: "Victory".to_string(),
        duration_secs: 42.0,
        boss_final_health: 0.0,
        players: vec![CombatantMetadata {
            name: "Warrior 1".to_string(),
            class_name: "Warrior".to_string(),
            max_health: 150.0,
            final_health: 90.0,
            damage_dealt: 1200.0,
            damage_taken: 60.0,
            healing_done: 0.0,
            final_position: (300.0, 384.0),
        }],
    }
}

// =============================================================================
// Damage Aggregation Tests
// =============================================================================

#[test]
fn test_damage_by_ability_empty_log() {
    let log = create_test_log();
    let damage = log.damage_by_ability("Warrior 1");
    assert!(damage.is_empty(), "Empty log should return empty damage map");
}

#[test]
fn test_damage_by_ability_single_source() {
    let mut log = create_test_log();

    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Slash", 30.0, false);
    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Slash", 30.0, false);
    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Whirlwind", 25.0, false);

    let damage = log.damage_by_ability("Warrior 1");

    assert_eq!(damage.len(), 2, "Should have 2 different abilities");
    assert_eq!(damage.get("Slash"), Some(&60.0), "Slash should total 60 damage");
    assert_eq!(damage.get("Whirlwind"), Some(&25.0), "Whirlwind should be 25 damage");
}

#[test]
fn test_damage_by_ability_ignores_other_sources() {
    let mut log = create_test_log();

    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Slash", 30.0, false);
    hit(&mut log, "Mage 2", "Illidan Stormrage", "Fireball", 40.0, false);

    let damage = log.damage_by_ability("Mage 2");
    assert_eq!(damage.len(), 1);
    assert_eq!(damage.get("Fireball"), Some(&40.0));
    assert!(!damage.contains_key("Slash"), "Warrior damage must not leak into Mage totals");
}

#[test]
fn test_damage_by_source_totals() {
    let mut log = create_test_log();

    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Slash", 30.0, false);
    hit(&mut log, "Mage 2", "Illidan Stormrage", "Fireball", 40.0, false);
    hit(&mut log, "Illidan Stormrage", "Warrior 1", "Fel Beam", 30.0, false);
    hit(&mut log, "Mage 2", "Illidan Stormrage", "Arcane Explosion", 20.0, false);

    let totals = log.damage_by_source();
    assert_eq!(totals.get("Warrior 1"), Some(&30.0));
    assert_eq!(totals.get("Mage 2"), Some(&60.0));
    assert_eq!(totals.get("Illidan Stormrage"), Some(&30.0));
}

// =============================================================================
// Healing Tests
// =============================================================================

#[test]
fn test_healing_by_source() {
    let mut log = create_test_log();

    log.log_healing(
        "Priest 1".to_string(),
        "Warrior 2".to_string(),
        "Holy Nova".to_string(),
        25.0,
        "Test message".to_string(),
    );
    log.log_healing(
        "Priest 1".to_string(),
        "Mage 3".to_string(),
        "Holy Nova".to_string(),
        15.0,
        "Test message".to_string(),
    );

    let totals = log.healing_by_source();
    assert_eq!(totals.get("Priest 1"), Some(&40.0));
    assert!(log.damage_by_source().is_empty(), "Healing must not count as damage");
}

// =============================================================================
// Killing Blows, Deaths and Revives
// =============================================================================

#[test]
fn test_killing_blows_counted_per_source() {
    let mut log = create_test_log();

    hit(&mut log, "Rogue 1", "Fel Imp", "Backstab", 30.0, true);
    hit(&mut log, "Rogue 1", "Fel Imp", "Backstab", 30.0, true);
    hit(&mut log, "Rogue 1", "Illidan Stormrage", "Backstab", 30.0, false);
    hit(&mut log, "Hunter 2", "Fel Imp", "Aimed Shot", 45.0, true);

    assert_eq!(log.killing_blows("Rogue 1"), 2);
    assert_eq!(log.killing_blows("Hunter 2"), 1);
    assert_eq!(log.killing_blows("Priest 3"), 0);
}

#[test]
fn test_deaths_in_order() {
    let mut log = create_test_log();

    log.log_death(
        "Mage 2".to_string(),
        Some("Illidan Stormrage".to_string()),
        "Mage 2 has been slain".to_string(),
    );
    log.log_death("Priest 3".to_string(), None, "Priest 3 dies".to_string());

    assert_eq!(log.deaths(), vec!["Mage 2", "Priest 3"]);
    assert_eq!(log.filter_by_type(CombatLogEventType::Death).len(), 2);
}

#[test]
fn test_revive_entry_carries_percent() {
    let mut log = create_test_log();

    log.log_revive("Mage 2".to_string(), 0.5, "Mage 2 is revived".to_string());

    let revives = log.filter_by_type(CombatLogEventType::Revive);
    assert_eq!(revives.len(), 1);
    assert_eq!(
        revives[0].data,
        Some(StructuredEventData::Revive {
            combatant: "Mage 2".to_string(),
            heal_percent: 0.5,
        })
    );
}

// =============================================================================
// Filtering
// =============================================================================

#[test]
fn test_hp_changes_only_skips_other_events() {
    let mut log = create_test_log();

    log.log(CombatLogEventType::MatchEvent, "Match started".to_string());
    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Slash", 30.0, false);
    log.log(CombatLogEventType::AuraApplied, "Bloodlust on Shaman 1".to_string());
    log.log_healing(
        "Shaman 1".to_string(),
        "Warrior 1".to_string(),
        "Healing Wave".to_string(),
        20.0,
        "Test message".to_string(),
    );

    let changes = log.hp_changes_only();
    assert_eq!(changes.len(), 2, "Only damage and healing should remain");
    assert_eq!(changes[0].event_type, CombatLogEventType::Damage);
    assert_eq!(changes[1].event_type, CombatLogEventType::Healing);
}

#[test]
fn test_recent_returns_tail_in_order() {
    let mut log = create_test_log();
    for i in 0..5 {
        log.log(CombatLogEventType::MatchEvent, format!("event {}", i));
    }

    let recent = log.recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].message, "event 3");
    assert_eq!(recent[1].message, "event 4");
    assert_eq!(log.recent(10).len(), 5, "Asking for more than exists returns everything");
}

#[test]
fn test_entries_take_match_time() {
    let mut log = create_test_log();
    log.match_time = 12.5;
    log.log(CombatLogEventType::MatchEvent, "Phase 2".to_string());

    assert_eq!(log.entries[0].timestamp, 12.5);

    log.clear();
    assert!(log.entries.is_empty());
    assert_eq!(log.match_time, 0.0);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_to_json_includes_metadata_and_entries() {
    let mut log = create_test_log();
    hit(&mut log, "Warrior 1", "Illidan Stormrage", "Slash", 30.0, false);

    let json = log.to_json(&create_metadata()).expect("log should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("output should be JSON");

    assert_eq!(value["metadata"]["boss_name"], "Illidan Stormrage");
    assert_eq!(value["metadata"]["players"][0]["class_name"], "Warrior");
    assert_eq!(value["entries"].as_array().map(|e| e.len()), Some(1));
    assert_eq!(value["entries"][0]["event_type"], "Damage");
}

#[test]
fn test_save_to_file_writes_requested_path() {
    let mut log = create_test_log();
    log.log(CombatLogEventType::MatchEvent, "Match started".to_string());

    let dir = std::env::temp_dir().join(format!("bossarena_log_test_{}", std::process::id()));
    let path = dir.join("match.json");
    let path_str = path.display().to_string();

    let written = log
        .save_to_file(&create_metadata(), Some(&path_str))
        .expect("save should succeed");
    assert_eq!(written, path_str);

    let contents = std::fs::read_to_string(&path).expect("file should exist");
    assert!(contents.contains("Match started"));

    let _ = std::fs::remove_dir_all(&dir);
}
