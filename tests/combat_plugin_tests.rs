//! Integration tests for the Bevy combat plugin
//!
//! These tests verify that input events reach the simulation, the tick runs
//! from `Time`, and cooldown notices come back out as events.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use bossarena::combat::events::{CooldownEvent, MovementInputEvent, SkillInputEvent};
use bossarena::combat::{CombatPlugin, SimulationSpeed};
use bossarena::simulation::input::{RawSkillInput, SkillAction};
use bossarena::simulation::skill_config::PlayerClass;
use bossarena::simulation::{Arena, PlayerId, SkillDispatcher};

fn create_app() -> (App, PlayerId) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
        .add_plugins(CombatPlugin);

    let world = app.world_mut();
    let config = world
        .resource::<SkillDispatcher>()
        .database()
        .class_config(PlayerClass::Warrior)
        .cloned()
        .expect("warrior config");
    let player = world.resource_mut::<Arena>().add_player(
        PlayerClass::Warrior,
        &config,
        "Warrior",
        Vec2::new(400.0, 400.0),
    );
    (app, player)
}

#[test]
fn test_skill_event_commits_cooldown_and_publishes_notice() {
    let (mut app, player) = create_app();

    app.world_mut().send_event(SkillInputEvent {
        player_id: player,
        slot: 0,
        input: RawSkillInput::new(SkillAction::Start, Vec2::X, 1.0),
    });
    app.update();

    let notices: Vec<&CooldownEvent> = app
        .world()
        .resource::<Events<CooldownEvent>>()
        .iter_current_update_events()
        .collect();
    assert_eq!(notices.len(), 1, "One successful press, one notice");
    assert_eq!(notices[0].notice.player_id, player);
    assert_eq!(notices[0].notice.cooldown_duration, 1000.0);

    let arena = app.world().resource::<Arena>();
    assert!(arena.cooldown_notices.is_empty(), "Outbox should be drained");
    assert_eq!(arena.melee_swings.len(), 1);
}

#[test]
fn test_time_drives_the_simulation_clock() {
    let (mut app, _) = create_app();

    // First update only initializes the clock
    app.update();
    app.update();
    app.update();

    let now = app.world().resource::<Arena>().now;
    assert!((now - 32.0).abs() < 1e-6, "Two 16 ms ticks should have run, got {}", now);
}

#[test]
fn test_paused_simulation_does_not_advance() {
    let (mut app, player) = create_app();
    app.world_mut().resource_mut::<SimulationSpeed>().pause();
    app.world_mut().send_event(MovementInputEvent {
        player_id: player,
        direction: Vec2::X,
    });

    app.update();
    app.update();

    let arena = app.world().resource::<Arena>();
    assert_eq!(arena.now, 0.0);
    assert_eq!(arena.player(player).unwrap().position(), Vec2::new(400.0, 400.0));
    assert_eq!(arena.player(player).unwrap().move_input, Vec2::X, "Input still recorded");

    app.world_mut().resource_mut::<SimulationSpeed>().normal_speed();
    app.update();

    let arena = app.world().resource::<Arena>();
    assert!((arena.now - 16.0).abs() < 1e-6, "Resumed clock should tick, got {}", arena.now);
    assert!(arena.player(player).unwrap().position().x > 400.0, "Player moves after resume");
}

#[test]
fn test_movement_event_moves_player() {
    let (mut app, player) = create_app();
    app.world_mut().send_event(MovementInputEvent {
        player_id: player,
        direction: Vec2::X,
    });

    for _ in 0..4 {
        app.update();
    }

    let position = app.world().resource::<Arena>().player(player).unwrap().position();
    assert!(position.x > 400.0, "Warrior should have moved right, at {:?}", position);
    assert_eq!(position.y, 400.0);
}
