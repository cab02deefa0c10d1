//! Combat logging
//!
//! Records all combat events for post-match analysis. Damage, healing, death
//! and revive entries carry structured data so results can be aggregated per
//! source without parsing messages.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in match time (seconds since match start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Machine-readable details (damage, healing, death and revive entries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StructuredEventData>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Healing done
    Healing,
    /// Skill used
    AbilityUsed,
    /// Buff/debuff applied
    AuraApplied,
    /// Buff/debuff removed
    AuraRemoved,
    /// Root or stun applied
    CrowdControl,
    /// Combatant died
    Death,
    /// Player brought back
    Revive,
    /// Match event (start, end, phase changes, etc.)
    MatchEvent,
}

/// Structured payload of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StructuredEventData {
    Damage {
        source: String,
        target: String,
        ability: String,
        amount: f32,
        is_killing_blow: bool,
    },
    Healing {
        source: String,
        target: String,
        ability: String,
        amount: f32,
    },
    Death {
        combatant: String,
        killer: Option<String>,
    },
    Revive {
        combatant: String,
        heal_percent: f32,
    },
}

/// Per-combatant summary written next to the log.
#[derive(Debug, Clone, Serialize)]
pub struct CombatantMetadata {
    pub name: String,
    pub class_name: String,
    pub max_health: f32,
    pub final_health: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
    pub final_position: (f32, f32),
}

/// Match summary written next to the log.
#[derive(Debug, Clone, Serialize)]
pub struct MatchMetadata {
    pub boss_name: String,
    pub outcome: String,
    pub duration_secs: f32,
    pub boss_final_health: f32,
    pub players: Vec<CombatantMetadata>,
}

#[derive(Serialize)]
struct SavedMatchLog<'a> {
    metadata: &'a MatchMetadata,
    entries: &'a [CombatLogEntry],
}

/// The combat log storing all events
#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current match time
    pub match_time: f32,
}

impl CombatLog {
    /// Clear the log for a new match
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, message, None);
    }

    fn push(
        &mut self,
        event_type: CombatLogEventType,
        message: String,
        data: Option<StructuredEventData>,
    ) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
            data,
        });
    }

    pub fn log_damage(
        &mut self,
        source: String,
        target: String,
        ability: String,
        amount: f32,
        is_killing_blow: bool,
        message: String,
    ) {
        self.push(
            CombatLogEventType::Damage,
            message,
            Some(StructuredEventData::Damage {
                source,
                target,
                ability,
                amount,
                is_killing_blow,
            }),
        );
    }

    pub fn log_healing(
        &mut self,
        source: String,
        target: String,
        ability: String,
        amount: f32,
        message: String,
    ) {
        self.push(
            CombatLogEventType::Healing,
            message,
            Some(StructuredEventData::Healing {
                source,
                target,
                ability,
                amount,
            }),
        );
    }

    pub fn log_death(&mut self, combatant: String, killer: Option<String>, message: String) {
        self.push(
            CombatLogEventType::Death,
            message,
            Some(StructuredEventData::Death { combatant, killer }),
        );
    }

    pub fn log_revive(&mut self, combatant: String, heal_percent: f32, message: String) {
        self.push(
            CombatLogEventType::Revive,
            message,
            Some(StructuredEventData::Revive {
                combatant,
                heal_percent,
            }),
        );
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Total damage per ability for one source
    pub fn damage_by_ability(&self, source: &str) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if let Some(StructuredEventData::Damage {
                source: s,
                ability,
                amount,
                ..
            }) = &entry.data
            {
                if s == source {
                    *totals.entry(ability.clone()).or_insert(0.0) += amount;
                }
            }
        }
        totals
    }

    /// Total damage dealt per source
    pub fn damage_by_source(&self) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if let Some(StructuredEventData::Damage { source, amount, .. }) = &entry.data {
                *totals.entry(source.clone()).or_insert(0.0) += amount;
            }
        }
        totals
    }

    /// Total healing done per source
    pub fn healing_by_source(&self) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if let Some(StructuredEventData::Healing { source, amount, .. }) = &entry.data {
                *totals.entry(source.clone()).or_insert(0.0) += amount;
            }
        }
        totals
    }

    /// Number of killing blows landed by `source`
    pub fn killing_blows(&self, source: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    &e.data,
                    Some(StructuredEventData::Damage { source: s, is_killing_blow: true, .. }) if s == source
                )
            })
            .count()
    }

    /// Names of everyone who died, in order
    pub fn deaths(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match &e.data {
                Some(StructuredEventData::Death { combatant, .. }) => Some(combatant.as_str()),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Serialize the log and metadata to pretty JSON
    pub fn to_json(&self, metadata: &MatchMetadata) -> Result<String, String> {
        let saved = SavedMatchLog {
            metadata,
            entries: &self.entries,
        };
        serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("Failed to serialize combat log: {}", e))
    }

    /// Save the log to `path`, or to `match_logs/match_<unix secs>.json` when
    /// no path is given. Returns the path written.
    pub fn save_to_file(
        &self,
        metadata: &MatchMetadata,
        path: Option<&str>,
    ) -> Result<String, String> {
        let filename = match path {
            Some(p) => p.to_string(),
            None => {
                let secs = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                format!("match_logs/match_{}.json", secs)
            }
        };

        if let Some(parent) = Path::new(&filename).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
            }
        }

        let json = self.to_json(metadata)?;
        std::fs::write(&filename, json)
            .map_err(|e| format!("Failed to write {}: {}", filename, e))?;
        Ok(filename)
    }
}
