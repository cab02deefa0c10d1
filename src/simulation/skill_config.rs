//! Data-Driven Skill Configuration
//!
//! Class, boss and enemy tuning lives in `assets/config/skills.ron`. Every
//! class has four skill slots; each slot is a [`SkillConfig`] whose
//! [`SkillKind`] is a closed set of archetypes the dispatcher matches on.
//!
//! ## Usage
//! ```ignore
//! let database = load_skill_database()?;
//! let cleave = database.skill(PlayerClass::Warrior, 0);
//! let same = database.skill_by_class_name("WARRIOR", 0);
//! ```
//!
//! Lookups never panic: a missing class or slot is simply `None`, which the
//! dispatcher treats as "skill unavailable".

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::constants::*;

/// Default location of the skill database.
pub const SKILL_DATABASE_PATH: &str = "assets/config/skills.ron";

/// Copy of the default database compiled into the binary.
const BUILTIN_SKILL_DATABASE: &str = include_str!("../../assets/config/skills.ron");

// ============================================================================
// Classes
// ============================================================================

/// Playable classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Warrior,
    Paladin,
    Shaman,
    Hunter,
    Priest,
    Mage,
    Druid,
    Rogue,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 8] = [
        PlayerClass::Warrior,
        PlayerClass::Paladin,
        PlayerClass::Shaman,
        PlayerClass::Hunter,
        PlayerClass::Priest,
        PlayerClass::Mage,
        PlayerClass::Druid,
        PlayerClass::Rogue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlayerClass::Warrior => "Warrior",
            PlayerClass::Paladin => "Paladin",
            PlayerClass::Shaman => "Shaman",
            PlayerClass::Hunter => "Hunter",
            PlayerClass::Priest => "Priest",
            PlayerClass::Mage => "Mage",
            PlayerClass::Druid => "Druid",
            PlayerClass::Rogue => "Rogue",
        }
    }

    /// Parse a class name, ignoring case ("WARRIOR", "warrior" and "Warrior" all match).
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(trimmed))
    }
}

// ============================================================================
// Effect parameters
// ============================================================================

/// Parameters of a buff or debuff.
///
/// Every field is optional; an effect only touches the stats it names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    /// Display name used in the combat log and for toggles
    #[serde(default)]
    pub name: Option<String>,
    /// Duration in ms (defaults: buff 3000, debuff 2000)
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub speed_multiplier: Option<f32>,
    #[serde(default)]
    pub max_hp_multiplier: Option<f32>,
    #[serde(default)]
    pub armor_bonus: Option<f32>,
    /// Temporary shield added on application
    #[serde(default)]
    pub shield: Option<f32>,
    /// Fraction of incoming damage prevented (0.9 = 90%)
    #[serde(default)]
    pub damage_reduction: Option<f32>,
    /// Multiplier on outgoing damage while active
    #[serde(default)]
    pub damage_multiplier: Option<f32>,
    #[serde(default)]
    pub rooted: bool,
    #[serde(default)]
    pub stunned: bool,
}

// ============================================================================
// Skill archetypes
// ============================================================================

/// One entry of a class's skill bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillConfig {
    pub name: String,
    /// Cooldown in ms
    #[serde(default)]
    pub cooldown: f64,
    pub kind: SkillKind,
}

/// Closed set of skill archetypes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SkillKind {
    Melee(MeleeSkill),
    Projectile(ProjectileSkill),
    Aoe(AoeSkill),
    Cast(CastSkill),
    Shield(ShieldSkill),
    Dash(DashSkill),
    Buff(BuffSkill),
}

impl SkillKind {
    /// Short archetype label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SkillKind::Melee(_) => "MELEE",
            SkillKind::Projectile(_) => "PROJECTILE",
            SkillKind::Aoe(_) => "AOE",
            SkillKind::Cast(_) => "CAST",
            SkillKind::Shield(_) => "SHIELD",
            SkillKind::Dash(_) => "DASH",
            SkillKind::Buff(_) => "BUFF",
        }
    }

    /// Depth of nested cast payloads (0 for anything that is not a cast).
    pub fn payload_depth(&self) -> u8 {
        match self {
            SkillKind::Cast(cast) => match &cast.payload {
                Some(payload) => 1 + payload.payload_depth(),
                None => 1,
            },
            _ => 0,
        }
    }
}

fn default_melee_angle() -> f32 {
    std::f32::consts::FRAC_PI_3
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeleeSkill {
    pub damage: f32,
    pub range: f32,
    /// Full cone width in radians
    #[serde(default = "default_melee_angle")]
    pub angle: f32,
}

/// What a projectile does to the targets it touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileEffect {
    /// Damages hostiles
    #[default]
    Damage,
    /// Heals allies other than its owner
    Heal,
}

/// How many projectiles a single use spawns and where they point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ProjectilePattern {
    #[default]
    Single,
    /// `count` projectiles spread evenly over `spread_angle`, centered on the aim
    Multi { count: u32, spread_angle: f32 },
    /// `count` projectiles evenly around the full circle, starting at the aim
    Radial { count: u32 },
}

fn default_projectile_speed() -> f32 {
    DEFAULT_PROJECTILE_SPEED
}

fn default_projectile_radius() -> f32 {
    DEFAULT_ENTITY_RADIUS
}

fn default_projectile_range() -> f32 {
    DEFAULT_PROJECTILE_RANGE
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSkill {
    #[serde(default)]
    pub damage: f32,
    #[serde(default)]
    pub heal_amount: f32,
    #[serde(default = "default_projectile_speed")]
    pub speed: f32,
    #[serde(default = "default_projectile_radius")]
    pub radius: f32,
    #[serde(default = "default_projectile_range")]
    pub range: f32,
    #[serde(default)]
    pub pierce: bool,
    #[serde(default)]
    pub effect: ProjectileEffect,
    #[serde(default)]
    pub pattern: ProjectilePattern,
    /// Area effect detonated where the projectile hits
    #[serde(default)]
    pub on_impact: Option<AoeSkill>,
}

/// Where an area effect lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AoeDelivery {
    /// Centered on the caster, applied immediately
    #[default]
    SelfCentered,
    /// Thrown by a carrier projectile; throw distance scales with intensity
    Lobbed {
        #[serde(default)]
        range: Option<f32>,
        #[serde(default)]
        speed: Option<f32>,
    },
}

/// Per-target effect of an area.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AoeEffect {
    /// Damages hostiles
    #[default]
    Damage,
    /// Heals players
    Heal,
    /// Buffs players (and heals them by `heal_amount` when set)
    Buff(EffectParams),
    /// Debuffs hostiles (and damages them by `damage` when set)
    Debuff(EffectParams),
    /// Damages hostiles and heals players
    Dual,
    /// Revives the players whose tombstones lie inside
    Revive {
        #[serde(default)]
        heal_percent: Option<f32>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AoeSkill {
    #[serde(default)]
    pub delivery: AoeDelivery,
    pub radius: f32,
    #[serde(default)]
    pub damage: f32,
    #[serde(default)]
    pub heal_amount: f32,
    #[serde(default)]
    pub effect: AoeEffect,
    /// Lifetime of the spawned area in ms (default 500)
    #[serde(default)]
    pub duration: Option<f64>,
    /// Re-apply the effect every `tick_rate` ms while the area lives
    #[serde(default)]
    pub tick_rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CastSkill {
    /// Charge-up time in ms
    pub cast_time: f64,
    #[serde(default)]
    pub channeled: bool,
    /// Skill executed when the cast completes
    #[serde(default)]
    pub payload: Option<Box<SkillKind>>,
}

fn default_shield_arc() -> f32 {
    DEFAULT_SHIELD_ARC
}

fn default_shield_duration() -> f64 {
    DEFAULT_SHIELD_DURATION
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShieldSkill {
    /// Blocking arc in radians
    #[serde(default = "default_shield_arc")]
    pub arc: f32,
    /// Duration in ms
    #[serde(default = "default_shield_duration")]
    pub duration: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashMode {
    #[default]
    Forward,
    Backwards,
    Teleport,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashSkill {
    #[serde(default)]
    pub mode: DashMode,
    /// Travel distance (default 200, teleport 150)
    #[serde(default)]
    pub distance: Option<f32>,
    /// Teleports only: when false the destination is clamped into the arena
    #[serde(default = "default_true")]
    pub pass_through_walls: bool,
}

impl DashSkill {
    pub fn resolved_distance(&self) -> f32 {
        match (self.distance, self.mode) {
            (Some(d), _) => d,
            (None, DashMode::Teleport) => DEFAULT_TELEPORT_DISTANCE,
            (None, _) => DEFAULT_DASH_DISTANCE,
        }
    }
}

/// Who receives a buff skill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BuffTarget {
    #[default]
    Caster,
    /// Most injured living ally within `range`, falling back to the caster
    NearestAlly { range: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuffSkill {
    pub effect: EffectParams,
    #[serde(default)]
    pub target: BuffTarget,
    /// Permanent while active; using the skill again removes it
    #[serde(default)]
    pub toggle: bool,
}

// ============================================================================
// Hostiles
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossPhaseConfig {
    /// Phase applies while hp / max_hp is at or below this fraction
    pub hp_threshold: f32,
    pub speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BossAbilityKind {
    /// Hostile projectile fired at the target
    Beam,
    /// Damages every player within `radius`
    Burst { radius: f32 },
    /// Short lunge at the target with contact damage
    Charge,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossAbilityConfig {
    pub name: String,
    pub cooldown: f64,
    pub damage: f32,
    pub kind: BossAbilityKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub name: String,
    pub max_hp: f32,
    pub speed: f32,
    #[serde(default)]
    pub phases: Vec<BossPhaseConfig>,
    #[serde(default)]
    pub abilities: Vec<BossAbilityConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub max_hp: f32,
    pub speed: f32,
    pub attack_range: f32,
    pub damage: f32,
    pub attack_cooldown: f64,
}

// ============================================================================
// Database
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    pub max_hp: f32,
    pub speed: f32,
    /// RGB in 0.0-1.0
    pub color: [f32; 3],
    pub skills: Vec<SkillConfig>,
}

/// Root structure of `skills.ron`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SkillDatabaseFile {
    pub classes: HashMap<PlayerClass, ClassConfig>,
    pub boss: BossConfig,
    pub enemy: EnemyConfig,
}

/// Problems found by [`SkillDatabase::validate`].
#[derive(Clone, Debug, PartialEq)]
pub enum SkillDatabaseIssue {
    MissingClass(PlayerClass),
    WrongSlotCount { class: PlayerClass, found: usize },
    PayloadTooDeep { class: PlayerClass, skill: String },
}

/// Resource holding all class, boss and enemy definitions.
#[derive(Resource, Clone, Debug)]
pub struct SkillDatabase {
    classes: HashMap<PlayerClass, ClassConfig>,
    pub boss: BossConfig,
    pub enemy: EnemyConfig,
}

impl SkillDatabase {
    pub fn new(file: SkillDatabaseFile) -> Self {
        Self {
            classes: file.classes,
            boss: file.boss,
            enemy: file.enemy,
        }
    }

    /// Parse a database from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, String> {
        let file: SkillDatabaseFile =
            ron::from_str(contents).map_err(|e| format!("Failed to parse skill database: {}", e))?;
        Ok(Self::new(file))
    }

    /// The database compiled into the binary.
    pub fn builtin() -> Result<Self, String> {
        Self::from_ron_str(BUILTIN_SKILL_DATABASE)
    }

    pub fn class_config(&self, class: PlayerClass) -> Option<&ClassConfig> {
        self.classes.get(&class)
    }

    /// Skill in `slot` for `class`, or `None` when unavailable.
    pub fn skill(&self, class: PlayerClass, slot: usize) -> Option<&SkillConfig> {
        self.classes.get(&class)?.skills.get(slot)
    }

    /// Like [`skill`](Self::skill) but takes a class name in any case.
    pub fn skill_by_class_name(&self, class_name: &str, slot: usize) -> Option<&SkillConfig> {
        self.skill(PlayerClass::from_name(class_name)?, slot)
    }

    /// Check every class is present with a full skill bar and shallow payloads.
    pub fn validate(&self) -> Result<(), Vec<SkillDatabaseIssue>> {
        let mut issues = Vec::new();
        for class in PlayerClass::ALL {
            let Some(config) = self.classes.get(&class) else {
                issues.push(SkillDatabaseIssue::MissingClass(class));
                continue;
            };
            if config.skills.len() != SKILL_SLOTS {
                issues.push(SkillDatabaseIssue::WrongSlotCount {
                    class,
                    found: config.skills.len(),
                });
            }
            for skill in &config.skills {
                if skill.kind.payload_depth() > MAX_PAYLOAD_DEPTH {
                    issues.push(SkillDatabaseIssue::PayloadTooDeep {
                        class,
                        skill: skill.name.clone(),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Load the skill database from a RON file.
///
/// Validation problems are reported as warnings: affected slots degrade to
/// "skill unavailable" instead of failing the load.
pub fn load_skill_database_from(path: &Path) -> Result<SkillDatabase, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let database = SkillDatabase::from_ron_str(&contents)
        .map_err(|e| format!("{} ({})", e, path.display()))?;

    if let Err(issues) = database.validate() {
        warn!("Skill database {} has issues: {:?}", path.display(), issues);
    }

    info!(
        "Loaded {} class definitions from {}",
        database.classes.len(),
        path.display()
    );

    Ok(database)
}

/// Load the skill database from `assets/config/skills.ron`, falling back to
/// the built-in copy when the file is absent.
pub fn load_skill_database() -> Result<SkillDatabase, String> {
    let path = Path::new(SKILL_DATABASE_PATH);
    if path.exists() {
        load_skill_database_from(path)
    } else {
        info!("{} not found, using built-in skill database", SKILL_DATABASE_PATH);
        SkillDatabase::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_is_case_insensitive() {
        assert_eq!(PlayerClass::from_name("WARRIOR"), Some(PlayerClass::Warrior));
        assert_eq!(PlayerClass::from_name("warrior"), Some(PlayerClass::Warrior));
        assert_eq!(PlayerClass::from_name("Warrior"), Some(PlayerClass::Warrior));
        assert_eq!(PlayerClass::from_name("Necromancer"), None);
    }

    #[test]
    fn test_builtin_database_is_valid() {
        let database = SkillDatabase::builtin().expect("built-in database should parse");
        assert_eq!(database.validate(), Ok(()));
    }

    #[test]
    fn test_missing_slot_is_unavailable() {
        let database = SkillDatabase::builtin().expect("built-in database should parse");
        assert!(database.skill(PlayerClass::Mage, 3).is_some());
        assert!(database.skill(PlayerClass::Mage, 4).is_none());
        assert!(database.skill_by_class_name("nobody", 0).is_none());
    }

    #[test]
    fn test_payload_depth() {
        let cast = SkillKind::Cast(CastSkill {
            cast_time: 1000.0,
            channeled: false,
            payload: Some(Box::new(SkillKind::Cast(CastSkill {
                cast_time: 1000.0,
                channeled: false,
                payload: Some(Box::new(SkillKind::Cast(CastSkill {
                    cast_time: 1000.0,
                    channeled: false,
                    payload: None,
                }))),
            }))),
        });
        assert_eq!(cast.payload_depth(), 3);
        assert!(cast.payload_depth() > MAX_PAYLOAD_DEPTH);
    }

    #[test]
    fn test_dash_distance_defaults() {
        let dash = DashSkill {
            mode: DashMode::Forward,
            distance: None,
            pass_through_walls: true,
        };
        assert_eq!(dash.resolved_distance(), DEFAULT_DASH_DISTANCE);
        let teleport = DashSkill {
            mode: DashMode::Teleport,
            ..dash
        };
        assert_eq!(teleport.resolved_distance(), DEFAULT_TELEPORT_DISTANCE);
    }
}
