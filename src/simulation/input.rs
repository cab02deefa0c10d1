//! Skill input normalization
//!
//! Transports deliver loosely shaped input (`{action, vector, intensity}` with
//! any field missing). [`SkillInput::normalize`] turns it into a fully defined
//! value: action defaults to START, the vector becomes a unit direction
//! (defaulting to +x), and intensity is clamped to [0, 1] (defaulting to 1).

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{normalize_or, DEFAULT_DIRECTION};

/// Phase of a button press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkillAction {
    #[default]
    Start,
    Hold,
    Release,
}

impl SkillAction {
    /// Parse an action name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "START" => Some(SkillAction::Start),
            "HOLD" => Some(SkillAction::Hold),
            "RELEASE" => Some(SkillAction::Release),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVector {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Skill input as received from a transport.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSkillInput {
    #[serde(default)]
    pub action: Option<SkillAction>,
    #[serde(default)]
    pub vector: Option<RawVector>,
    #[serde(default)]
    pub intensity: Option<f32>,
}

impl RawSkillInput {
    pub fn new(action: SkillAction, vector: Vec2, intensity: f32) -> Self {
        Self {
            action: Some(action),
            vector: Some(RawVector {
                x: vector.x,
                y: vector.y,
            }),
            intensity: Some(intensity),
        }
    }

    /// Parse a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, String> {
        serde_json::from_str(payload).map_err(|e| format!("Invalid skill input: {}", e))
    }
}

/// Fully defined skill input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillInput {
    pub action: SkillAction,
    /// Unit aim direction
    pub direction: Vec2,
    /// Hold strength in [0, 1]
    pub intensity: f32,
}

impl Default for SkillInput {
    fn default() -> Self {
        Self {
            action: SkillAction::Start,
            direction: DEFAULT_DIRECTION,
            intensity: 1.0,
        }
    }
}

impl SkillInput {
    pub fn normalize(raw: &RawSkillInput) -> Self {
        let vector = raw
            .vector
            .map(|v| Vec2::new(v.x, v.y))
            .unwrap_or(Vec2::ZERO);
        let intensity = match raw.intensity {
            Some(i) if i.is_finite() => i.clamp(0.0, 1.0),
            _ => 1.0,
        };
        Self {
            action: raw.action.unwrap_or_default(),
            direction: normalize_or(vector, DEFAULT_DIRECTION),
            intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gets_defaults() {
        let input = SkillInput::normalize(&RawSkillInput::default());
        assert_eq!(input, SkillInput::default());
    }

    #[test]
    fn test_vector_is_normalized_and_intensity_clamped() {
        let raw = RawSkillInput::new(SkillAction::Release, Vec2::new(0.0, 5.0), 3.0);
        let input = SkillInput::normalize(&raw);
        assert_eq!(input.action, SkillAction::Release);
        assert_eq!(input.direction, Vec2::Y);
        assert_eq!(input.intensity, 1.0);

        let raw = RawSkillInput::new(SkillAction::Start, Vec2::ZERO, -1.0);
        let input = SkillInput::normalize(&raw);
        assert_eq!(input.direction, Vec2::X, "zero vector falls back to +x");
        assert_eq!(input.intensity, 0.0);
    }

    #[test]
    fn test_nan_intensity_defaults_to_full() {
        let raw = RawSkillInput {
            intensity: Some(f32::NAN),
            ..Default::default()
        };
        assert_eq!(SkillInput::normalize(&raw).intensity, 1.0);
    }

    #[test]
    fn test_parse_json_payload() {
        let raw = RawSkillInput::from_json(r#"{"action":"HOLD","vector":{"x":1,"y":1}}"#)
            .expect("payload should parse");
        assert_eq!(raw.action, Some(SkillAction::Hold));
        assert!(raw.intensity.is_none());
        assert!(RawSkillInput::from_json(r#"{"action":"SPIN"}"#).is_err());
    }

    #[test]
    fn test_action_parse_ignores_case() {
        assert_eq!(SkillAction::parse("release"), Some(SkillAction::Release));
        assert_eq!(SkillAction::parse("bogus"), None);
    }
}
