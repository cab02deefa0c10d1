//! JSON configuration parsing for headless mode
//!
//! Describes the party, optional adds, and run limits of a headless boss fight.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::simulation::skill_config::PlayerClass;

/// Largest party the arena seats
pub const MAX_PARTY_SIZE: usize = 4;
/// Largest number of adds spawned next to the boss
pub const MAX_ENEMIES: usize = 8;

/// Headless match configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessMatchConfig {
    /// Party composition (1-4 class names)
    pub party: Vec<String>,
    /// Number of adds spawned beside the boss (default: 0)
    #[serde(default)]
    pub enemies: usize,
    /// Maximum match duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic match reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for match log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Skill database to load instead of `assets/config/skills.ron`
    #[serde(default)]
    pub skills_path: Option<String>,
    /// Simulation ticks per second (default: 60)
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f32,
}

fn default_max_duration() -> f32 {
    300.0
}

fn default_tick_rate() -> f32 {
    60.0
}

impl Default for HeadlessMatchConfig {
    fn default() -> Self {
        Self {
            party: vec![
                "Warrior".to_string(),
                "Priest".to_string(),
                "Mage".to_string(),
                "Hunter".to_string(),
            ],
            enemies: 0,
            max_duration_secs: default_max_duration(),
            random_seed: None,
            output_path: None,
            skills_path: None,
            tick_rate_hz: default_tick_rate(),
        }
    }
}

impl HeadlessMatchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessMatchConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.party.is_empty() || self.party.len() > MAX_PARTY_SIZE {
            return Err(format!("party must have 1-{} members", MAX_PARTY_SIZE));
        }

        for class_name in &self.party {
            Self::parse_class(class_name)?;
        }

        if self.enemies > MAX_ENEMIES {
            return Err(format!("enemies must be at most {}", MAX_ENEMIES));
        }

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        if self.tick_rate_hz.is_nan() || self.tick_rate_hz <= 0.0 {
            return Err("tick_rate_hz must be positive".to_string());
        }

        Ok(())
    }

    /// The party's classes in configuration order
    pub fn party_classes(&self) -> Result<Vec<PlayerClass>, String> {
        self.party.iter().map(|name| Self::parse_class(name)).collect()
    }

    fn parse_class(name: &str) -> Result<PlayerClass, String> {
        PlayerClass::from_name(name).ok_or_else(|| {
            let valid: Vec<&str> = PlayerClass::ALL.iter().map(|c| c.name()).collect();
            format!(
                "Unknown class: '{}'. Valid classes: {}",
                name,
                valid.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: HeadlessMatchConfig =
            serde_json::from_str(r#"{ "party": ["Warrior", "Priest"] }"#).unwrap();
        assert_eq!(config.enemies, 0);
        assert_eq!(config.max_duration_secs, 300.0);
        assert_eq!(config.tick_rate_hz, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_class_names_are_case_insensitive() {
        let config: HeadlessMatchConfig =
            serde_json::from_str(r#"{ "party": ["druid", "ROGUE"] }"#).unwrap();
        assert_eq!(
            config.party_classes().unwrap(),
            vec![PlayerClass::Druid, PlayerClass::Rogue]
        );
    }

    #[test]
    fn test_rejects_oversized_party() {
        let config = HeadlessMatchConfig {
            party: vec!["Warrior".to_string(); 5],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_class() {
        let config = HeadlessMatchConfig {
            party: vec!["Necromancer".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("Necromancer"), "error should name the class: {}", err);
    }
}
