//! Simulation Constants
//!
//! Centralized location for the arena dimensions and the fallback values used
//! when a skill configuration leaves a field out.
//!
//! Times are milliseconds, distances are arena pixels, speeds are pixels per
//! second.

// ============================================================================
// Arena
// ============================================================================

/// Arena width in pixels.
pub const ARENA_WIDTH: f32 = 1024.0;

/// Arena height in pixels.
pub const ARENA_HEIGHT: f32 = 768.0;

/// Nominal tick rate the tuning values were authored against.
pub const TICK_RATE_HZ: f64 = 60.0;

// ============================================================================
// Actors
// ============================================================================

pub const PLAYER_RADIUS: f32 = 20.0;
pub const BOSS_RADIUS: f32 = 60.0;
pub const ENEMY_RADIUS: f32 = 20.0;
pub const TOMBSTONE_RADIUS: f32 = 25.0;

/// Radius assumed for a target that reports none.
pub const DEFAULT_TARGET_RADIUS: f32 = 20.0;

/// Number of skill slots per player.
pub const SKILL_SLOTS: usize = 4;

/// Fraction of max hp a player returns with when revived without an explicit percent.
pub const DEFAULT_REVIVE_PERCENT: f32 = 0.5;

// ============================================================================
// Ability entity defaults
// ============================================================================

pub const DEFAULT_ENTITY_LIFETIME: f64 = 5000.0;
pub const DEFAULT_ENTITY_RADIUS: f32 = 10.0;

pub const PROJECTILE_LIFETIME: f64 = 3000.0;
pub const DEFAULT_PROJECTILE_SPEED: f32 = 400.0;
pub const DEFAULT_PROJECTILE_RANGE: f32 = 500.0;

pub const MELEE_SWING_LIFETIME: f64 = 200.0;
/// Lifetime of the fading melee visual spawned by the melee handler.
pub const MELEE_VISUAL_LIFETIME: f64 = 400.0;

pub const AREA_EFFECT_LIFETIME: f64 = 500.0;

pub const HEAL_PULSE_LIFETIME: f64 = 500.0;
pub const HEAL_PULSE_RADIUS: f32 = 15.0;
/// Upward drift of a heal pulse in pixels per second.
pub const HEAL_PULSE_RISE_SPEED: f32 = 30.0;

// ============================================================================
// Area effects
// ============================================================================

/// Default throw distance of a lobbed area effect at full intensity.
pub const DEFAULT_LOB_RANGE: f32 = 300.0;
/// Default carrier speed for lobbed area effects.
pub const DEFAULT_LOB_SPEED: f32 = 500.0;
/// Carrier radius is the area radius divided by this.
pub const LOB_CARRIER_RADIUS_DIVISOR: f32 = 4.0;
pub const DEFAULT_LOB_CARRIER_RADIUS: f32 = 10.0;

// ============================================================================
// Shields, dashes, casts
// ============================================================================

pub const DEFAULT_SHIELD_ARC: f32 = std::f32::consts::FRAC_PI_2;
pub const DEFAULT_SHIELD_DURATION: f64 = 3000.0;
/// Movement multiplier while a shield is raised.
pub const SHIELD_MOVE_MULTIPLIER: f32 = 0.5;

pub const DEFAULT_DASH_DISTANCE: f32 = 200.0;
pub const DEFAULT_TELEPORT_DISTANCE: f32 = 150.0;
/// Every dash resolves over this fixed duration.
pub const DASH_DURATION: f64 = 200.0;

/// Drift in either axis beyond which a cast is interrupted.
pub const CAST_MOVE_TOLERANCE: f32 = 1.0;

/// Maximum nesting of cast payloads.
pub const MAX_PAYLOAD_DEPTH: u8 = 2;

// ============================================================================
// Status effects
// ============================================================================

pub const DEFAULT_BUFF_DURATION: f64 = 3000.0;
pub const DEFAULT_DEBUFF_DURATION: f64 = 2000.0;

// ============================================================================
// Hostile AI
// ============================================================================

/// Boss stops chasing once this close to its target.
pub const BOSS_STOP_DISTANCE: f32 = 100.0;
/// Minimum gap between two boss abilities.
pub const BOSS_ABILITY_GAP: f64 = 1500.0;
/// Delay before the boss uses its first ability.
pub const BOSS_OPENING_DELAY: f64 = 2000.0;
pub const BOSS_BEAM_SPEED: f32 = 500.0;
pub const BOSS_BEAM_RADIUS: f32 = 10.0;
pub const BOSS_BEAM_RANGE: f32 = 800.0;
/// Shadow Dash travel distance.
pub const BOSS_DASH_DISTANCE: f32 = 200.0;
