//! Headless match execution
//!
//! Runs a boss fight without any graphical output, driving the party with
//! bots. The app is stepped manually at a fixed tick so results are
//! reproducible for a given seed.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::path::Path;
use std::time::Duration;

use crate::combat::log::{CombatLogEventType, CombatantMetadata, MatchMetadata};
use crate::combat::{CombatPlugin, CombatSystemPhase};
use crate::simulation::arena::Arena;
use crate::simulation::dispatcher::SkillDispatcher;
use crate::simulation::skill_config::{load_skill_database, load_skill_database_from, PlayerClass};

use super::bots::{party_bot_system, GameRng, PartyBotState};
use super::config::HeadlessMatchConfig;

/// Horizontal offset of the party from the arena center
const PARTY_SPAWN_OFFSET: f32 = -300.0;
/// Vertical spacing between party members
const PARTY_SPAWN_SPACING: f32 = 80.0;
/// Horizontal offset of the boss from the arena center
const BOSS_SPAWN_OFFSET: f32 = 200.0;
/// Distance of adds from the boss
const ENEMY_SPAWN_RADIUS: f32 = 90.0;

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The boss died
    Victory,
    /// Every player died
    Defeat,
    /// Neither side won before the time limit
    Timeout,
}

impl MatchOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            MatchOutcome::Victory => "Victory",
            MatchOutcome::Defeat => "Defeat",
            MatchOutcome::Timeout => "Timeout",
        }
    }
}

/// Statistics for a single player after the match
#[derive(Debug, Clone)]
pub struct PlayerResult {
    pub name: String,
    pub class: PlayerClass,
    pub max_health: f32,
    /// Health remaining at match end (0 if dead)
    pub final_health: f32,
    pub survived: bool,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
}

/// Result of a completed headless match
///
/// This struct provides programmatic access to match results for testing and analysis.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    /// Total match duration in seconds
    pub match_time: f32,
    pub boss_final_health: f32,
    pub players: Vec<PlayerResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Where the combat log was written, if saving succeeded
    pub log_path: Option<String>,
}

/// Resource to track headless match state
#[derive(Resource)]
pub struct HeadlessMatchState {
    /// Maximum match duration before declaring a timeout
    pub max_duration: f32,
    /// Elapsed match time
    pub elapsed_time: f32,
    /// Custom output path for match log
    pub output_path: Option<String>,
    /// Whether the match has completed
    pub match_complete: bool,
    pub random_seed: Option<u64>,
    /// Match result (populated when match completes)
    pub result: Option<MatchResult>,
}

/// Plugin for headless match execution
pub struct HeadlessPlugin {
    pub config: HeadlessMatchConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let game_rng = match self.config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        app.insert_resource(HeadlessMatchState {
            max_duration: self.config.max_duration_secs,
            elapsed_time: 0.0,
            output_path: self.config.output_path.clone(),
            match_complete: false,
            random_seed: self.config.random_seed,
            result: None,
        })
        .insert_resource(game_rng)
        .init_resource::<PartyBotState>()
        .insert_resource(HeadlessSetup {
            config: self.config.clone(),
        })
        .add_systems(Startup, headless_setup_match)
        .add_systems(Update, party_bot_system.before(CombatSystemPhase::Input))
        .add_systems(
            Update,
            (headless_track_time, headless_check_match_end)
                .chain()
                .after(CombatSystemPhase::Output),
        );
    }
}

#[derive(Resource)]
struct HeadlessSetup {
    config: HeadlessMatchConfig,
}

/// Spawn the party, the boss and any adds
fn headless_setup_match(
    setup: Res<HeadlessSetup>,
    dispatcher: Res<SkillDispatcher>,
    mut arena: ResMut<Arena>,
    mut rng: ResMut<GameRng>,
) {
    let database = dispatcher.database();
    let center = arena.bounds.center();

    arena.log.clear();
    arena.log.log(
        CombatLogEventType::MatchEvent,
        "Match started (headless mode)!".to_string(),
    );

    let classes: Vec<PlayerClass> = setup
        .config
        .party
        .iter()
        .filter_map(|name| PlayerClass::from_name(name))
        .collect();
    let party_size = classes.len() as f32;
    for (i, class) in classes.into_iter().enumerate() {
        let Some(class_config) = database.class_config(class) else {
            warn!("No configuration for {}, skipping", class.name());
            continue;
        };
        let offset_y = (i as f32 - (party_size - 1.0) / 2.0) * PARTY_SPAWN_SPACING;
        let position = center + Vec2::new(PARTY_SPAWN_OFFSET, offset_y);
        let name = format!("{} {}", class.name(), i + 1);
        arena.add_player(class, class_config, name, position);
    }

    let boss_position = center + Vec2::new(BOSS_SPAWN_OFFSET, 0.0);
    arena.add_boss(&database.boss, boss_position);

    for _ in 0..setup.config.enemies {
        let angle = rng.random_range(0.0, std::f32::consts::TAU);
        let position = boss_position + Vec2::from_angle(angle) * ENEMY_SPAWN_RADIUS;
        arena.add_enemy(&database.enemy, position);
    }

    info!(
        "Headless match setup complete: {} players vs {} ({} adds)",
        arena.players.len(),
        database.boss.name,
        setup.config.enemies
    );
}

/// Track elapsed match time (used for timeout detection)
fn headless_track_time(time: Res<Time>, mut headless_state: ResMut<HeadlessMatchState>) {
    headless_state.elapsed_time += time.delta_secs();
}

/// Check if the match has ended (boss dead, party wiped, or timeout)
fn headless_check_match_end(arena: Res<Arena>, mut headless_state: ResMut<HeadlessMatchState>) {
    if headless_state.match_complete {
        return;
    }

    let boss_alive = arena.bosses.iter().any(|b| b.combatant.is_alive());
    let outcome = if !boss_alive {
        MatchOutcome::Victory
    } else if arena.living_player_count() == 0 {
        MatchOutcome::Defeat
    } else if headless_state.elapsed_time >= headless_state.max_duration {
        MatchOutcome::Timeout
    } else {
        return;
    };

    info!(
        "Match ended after {:.1}s: {}",
        headless_state.elapsed_time,
        outcome.name()
    );

    let log_path = save_headless_match_log(&arena, outcome, &headless_state);
    let result = build_match_result(&arena, outcome, &headless_state, log_path);
    headless_state.result = Some(result);
    headless_state.match_complete = true;
}

/// Build the MatchResult from current arena state
fn build_match_result(
    arena: &Arena,
    outcome: MatchOutcome,
    headless_state: &HeadlessMatchState,
    log_path: Option<String>,
) -> MatchResult {
    let players = arena
        .players
        .iter()
        .map(|player| PlayerResult {
            name: player.combatant.name.clone(),
            class: player.class,
            max_health: player.combatant.max_hp,
            final_health: player.combatant.hp,
            survived: player.is_alive(),
            damage_dealt: player.combatant.damage_dealt,
            damage_taken: player.combatant.damage_taken,
            healing_done: player.combatant.healing_done,
        })
        .collect();

    MatchResult {
        outcome,
        match_time: headless_state.elapsed_time,
        boss_final_health: arena.bosses.first().map(|b| b.combatant.hp).unwrap_or(0.0),
        players,
        random_seed: headless_state.random_seed,
        log_path,
    }
}

/// Save the combat log to a file
fn save_headless_match_log(
    arena: &Arena,
    outcome: MatchOutcome,
    headless_state: &HeadlessMatchState,
) -> Option<String> {
    let players = arena
        .players
        .iter()
        .map(|player| CombatantMetadata {
            name: player.combatant.name.clone(),
            class_name: player.class.name().to_string(),
            max_health: player.combatant.max_hp,
            final_health: player.combatant.hp,
            damage_dealt: player.combatant.damage_dealt,
            damage_taken: player.combatant.damage_taken,
            healing_done: player.combatant.healing_done,
            final_position: (player.position().x, player.position().y),
        })
        .collect();

    let boss = arena.bosses.first();
    let match_metadata = MatchMetadata {
        boss_name: boss.map(|b| b.combatant.name.clone()).unwrap_or_default(),
        outcome: outcome.name().to_string(),
        duration_secs: headless_state.elapsed_time,
        boss_final_health: boss.map(|b| b.combatant.hp).unwrap_or(0.0),
        players,
    };

    match arena
        .log
        .save_to_file(&match_metadata, headless_state.output_path.as_deref())
    {
        Ok(filename) => {
            info!("Match complete. Log saved to: {}", filename);
            Some(filename)
        }
        Err(e) => {
            warn!("Failed to save combat log: {}", e);
            None
        }
    }
}

/// Load the skill database named by the config, or the default one
fn load_dispatcher(config: &HeadlessMatchConfig) -> Result<SkillDispatcher, String> {
    let database = match &config.skills_path {
        Some(path) => load_skill_database_from(Path::new(path))?,
        None => load_skill_database()?,
    };
    Ok(SkillDispatcher::new(database))
}

/// Run a headless match with the given configuration
///
/// With `with_logging` the Bevy log plugin is added so `info!` output reaches
/// stderr; tests leave it off.
pub fn run_headless_match(
    config: HeadlessMatchConfig,
    with_logging: bool,
) -> Result<MatchResult, String> {
    config.validate()?;
    let dispatcher = load_dispatcher(&config)?;
    let tick = Duration::from_secs_f64(1.0 / config.tick_rate_hz as f64);
    // Safety margin on top of the time limit in case the clock stalls
    let max_updates = ((config.max_duration_secs as f64 + 5.0) * config.tick_rate_hz as f64) as u64;

    info!(
        "Starting headless match: party {:?}, {} adds, max {:.0}s",
        config.party, config.enemies, config.max_duration_secs
    );

    let mut app = App::new();
    // Minimal plugins - no window, no rendering
    app.add_plugins(MinimalPlugins);
    if with_logging {
        app.add_plugins(bevy::log::LogPlugin::default());
    }
    app.insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .insert_resource(dispatcher)
        .add_plugins(CombatPlugin)
        .add_plugins(HeadlessPlugin { config });

    app.finish();
    app.cleanup();

    for _ in 0..max_updates {
        app.update();
        let complete = app
            .world()
            .get_resource::<HeadlessMatchState>()
            .is_some_and(|state| state.match_complete);
        if complete {
            break;
        }
    }

    app.world_mut()
        .get_resource_mut::<HeadlessMatchState>()
        .and_then(|mut state| state.result.take())
        .ok_or_else(|| "Match did not finish".to_string())
}
