//! Integration tests for the skill database
//!
//! These tests verify that:
//! - The shipped `skills.ron` parses and matches the built-in copy
//! - Every class has a full skill bar with the expected archetypes
//! - Broken or partial databases are reported instead of panicking

use std::path::Path;

use bossarena::simulation::skill_config::{
    load_skill_database_from, AoeDelivery, AoeEffect, BossAbilityKind, DashMode, PlayerClass,
    ProjectilePattern, SkillDatabase, SkillDatabaseIssue, SkillKind,
};

fn builtin() -> SkillDatabase {
    SkillDatabase::builtin().expect("built-in database should parse")
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_asset_file_matches_builtin() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/config/skills.ron");
    let loaded = load_skill_database_from(&path).expect("asset file should load");
    let builtin = builtin();

    for class in PlayerClass::ALL {
        assert_eq!(
            loaded.class_config(class),
            builtin.class_config(class),
            "{} differs between asset and built-in copy",
            class.name()
        );
    }
    assert_eq!(loaded.boss, builtin.boss);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = load_skill_database_from(Path::new("does/not/exist.ron"));
    let err = result.expect_err("missing file should fail");
    assert!(err.contains("exist.ron"), "error should name the path: {}", err);
}

#[test]
fn test_malformed_ron_is_an_error() {
    let result = SkillDatabase::from_ron_str("(classes: {Warrior: (max_hp: \"lots\")})");
    assert!(result.is_err());
}

// =============================================================================
// Content Tests
// =============================================================================

#[test]
fn test_every_class_has_four_skills() {
    let database = builtin();
    assert!(database.validate().is_ok(), "{:?}", database.validate());

    for class in PlayerClass::ALL {
        let config = database.class_config(class).expect("class present");
        assert_eq!(config.skills.len(), 4, "{} skill bar", class.name());
        assert!(config.max_hp > 0.0);
        assert!(config.speed > 0.0);
    }
}

#[test]
fn test_skill_lookup_by_class_name() {
    let database = builtin();

    let skill = database
        .skill_by_class_name("hunter", 1)
        .expect("Hunter slot 1 exists");
    assert_eq!(skill.name, "Multi-Shot");
    match &skill.kind {
        SkillKind::Projectile(projectile) => assert_eq!(
            projectile.pattern,
            ProjectilePattern::Multi {
                count: 6,
                spread_angle: std::f32::consts::FRAC_PI_2,
            }
        ),
        other => panic!("Multi-Shot should be a projectile, got {:?}", other),
    }

    assert!(database.skill_by_class_name("Necromancer", 0).is_none());
    assert!(database.skill_by_class_name("Hunter", 4).is_none());
}

#[test]
fn test_archetypes_of_signature_skills() {
    let database = builtin();

    let trap = database.skill(PlayerClass::Hunter, 3).unwrap();
    assert!(matches!(
        &trap.kind,
        SkillKind::Aoe(aoe) if matches!(aoe.delivery, AoeDelivery::Lobbed { .. })
    ));

    let blink = database.skill(PlayerClass::Mage, 2).unwrap();
    assert!(matches!(&blink.kind, SkillKind::Dash(dash) if dash.mode == DashMode::Teleport));

    let rez = database.skill(PlayerClass::Priest, 3).unwrap();
    let SkillKind::Cast(cast) = &rez.kind else {
        panic!("Mass Resurrection should be a cast");
    };
    assert_eq!(cast.cast_time, 2000.0);
    assert!(matches!(
        cast.payload.as_deref(),
        Some(SkillKind::Aoe(aoe)) if matches!(aoe.effect, AoeEffect::Revive { .. })
    ));
    assert_eq!(rez.kind.payload_depth(), 1);
}

#[test]
fn test_boss_configuration() {
    let database = builtin();
    let boss = &database.boss;

    assert_eq!(boss.name, "Illidan Stormrage");
    assert_eq!(boss.max_hp, 5000.0);
    assert_eq!(boss.phases.len(), 3);
    assert!(
        boss.phases.windows(2).all(|w| w[0].hp_threshold > w[1].hp_threshold),
        "Phases should be ordered by descending threshold"
    );
    assert!(boss
        .abilities
        .iter()
        .any(|a| matches!(a.kind, BossAbilityKind::Burst { .. })));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_partial_database_reports_missing_classes() {
    let ron = r#"
#![enable(implicit_some)]
(
    classes: {
        Warrior: (
            max_hp: 150.0,
            speed: 150.0,
            color: (1.0, 0.0, 0.0),
            skills: [
                (name: "Cleave", cooldown: 1000.0, kind: Melee((damage: 50.0, range: 80.0))),
            ],
        ),
    },
    boss: (name: "Dummy", max_hp: 100.0, speed: 0.0),
    enemy: (max_hp: 10.0, speed: 0.0, attack_range: 10.0, damage: 1.0, attack_cooldown: 1000.0),
)
"#;
    let database = SkillDatabase::from_ron_str(ron).expect("partial database still parses");
    let issues = database.validate().expect_err("partial database is invalid");

    assert!(issues.contains(&SkillDatabaseIssue::WrongSlotCount {
        class: PlayerClass::Warrior,
        found: 1,
    }));
    assert!(issues.contains(&SkillDatabaseIssue::MissingClass(PlayerClass::Mage)));
    assert_eq!(
        issues
            .iter()
            .filter(|i| matches!(i, SkillDatabaseIssue::MissingClass(_)))
            .count(),
        7
    );

    // Unconfigured slots are simply unavailable
    assert!(database.skill(PlayerClass::Warrior, 0).is_some());
    assert!(database.skill(PlayerClass::Warrior, 1).is_none());
    assert!(database.skill(PlayerClass::Mage, 0).is_none());
}
