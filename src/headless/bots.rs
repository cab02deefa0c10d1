//! Party bots for headless matches
//!
//! Each living player closes to its engage distance from the boss and presses
//! a random ready skill aimed at it every few hundred milliseconds.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::combat::events::{MovementInputEvent, SkillInputEvent};
use crate::simulation::arena::{Arena, Player};
use crate::simulation::combatant::PlayerId;
use crate::simulation::constants::SKILL_SLOTS;
use crate::simulation::dispatcher::SkillDispatcher;
use crate::simulation::geometry::{self, DEFAULT_DIRECTION};
use crate::simulation::input::{RawSkillInput, SkillAction};
use crate::simulation::skill_config::SkillKind;

/// Time between skill decisions for one bot (ms)
const BOT_DECISION_INTERVAL: f64 = 250.0;
/// Random extra delay added to each decision (ms)
const BOT_DECISION_JITTER: f32 = 150.0;
/// Engage distance for classes with a melee skill
const MELEE_ENGAGE_DISTANCE: f32 = 70.0;
/// Engage distance for everyone else
const RANGED_ENGAGE_DISTANCE: f32 = 240.0;
/// Slack around the engage distance before moving again
const ENGAGE_TOLERANCE: f32 = 15.0;

/// Seedable random number generator shared by the headless systems
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Pick an index in `0..len`; `len` must be non-zero
    pub fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// When each bot may next press a skill
#[derive(Resource, Default)]
pub struct PartyBotState {
    next_decision_at: HashMap<PlayerId, f64>,
}

fn engage_distance(dispatcher: &SkillDispatcher, player: &Player) -> f32 {
    let has_melee = dispatcher
        .database()
        .class_config(player.class)
        .is_some_and(|config| {
            config
                .skills
                .iter()
                .any(|skill| matches!(skill.kind, SkillKind::Melee(_)))
        });
    if has_melee {
        MELEE_ENGAGE_DISTANCE
    } else {
        RANGED_ENGAGE_DISTANCE
    }
}

/// Drive every living player toward the boss and press ready skills
pub fn party_bot_system(
    arena: Res<Arena>,
    dispatcher: Res<SkillDispatcher>,
    mut rng: ResMut<GameRng>,
    mut state: ResMut<PartyBotState>,
    mut movement_events: EventWriter<MovementInputEvent>,
    mut skill_events: EventWriter<SkillInputEvent>,
) {
    let Some(boss_position) = arena
        .bosses
        .iter()
        .find(|b| b.combatant.is_alive())
        .map(|b| b.combatant.position)
    else {
        return;
    };
    let now = arena.now;

    for player in arena.players.iter().filter(|p| p.is_alive()) {
        let to_boss = boss_position - player.position();
        let distance = to_boss.length();
        let aim = geometry::normalize_or(to_boss, DEFAULT_DIRECTION);
        let engage = engage_distance(&dispatcher, player);

        let direction = if distance > engage + ENGAGE_TOLERANCE {
            aim
        } else if distance < engage - ENGAGE_TOLERANCE && engage > MELEE_ENGAGE_DISTANCE {
            -aim
        } else {
            Vec2::ZERO
        };
        movement_events.send(MovementInputEvent {
            player_id: player.id,
            direction,
        });

        if player.is_casting() || !player.can_act() {
            continue;
        }
        let next_decision = state.next_decision_at.get(&player.id).copied().unwrap_or(0.0);
        if now < next_decision {
            continue;
        }
        let jitter = rng.random_range(0.0, BOT_DECISION_JITTER) as f64;
        state
            .next_decision_at
            .insert(player.id, now + BOT_DECISION_INTERVAL + jitter);

        let ready: SmallVec<[usize; SKILL_SLOTS]> = (0..SKILL_SLOTS)
            .filter(|slot| player.cooldown_remaining(*slot, now) <= 0.0)
            .collect();
        if ready.is_empty() {
            continue;
        }
        let slot = ready[rng.pick(ready.len())];
        let intensity = (distance / RANGED_ENGAGE_DISTANCE).clamp(0.3, 1.0);

        skill_events.send(SkillInputEvent {
            player_id: player.id,
            slot,
            input: RawSkillInput::new(SkillAction::Start, aim, intensity),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = GameRng::from_seed(42);
        let mut b = GameRng::from_seed(42);
        for _ in 0..10 {
            assert_eq!(a.random_f32(), b.random_f32());
        }
        assert_eq!(a.seed, Some(42));
    }

    #[test]
    fn test_random_range_stays_in_bounds() {
        let mut rng = GameRng::from_seed(7);
        for _ in 0..100 {
            let value = rng.random_range(10.0, 20.0);
            assert!((10.0..20.0).contains(&value), "out of range: {}", value);
        }
    }
}
