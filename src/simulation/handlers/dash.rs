//! Dash and teleport handler
//!
//! Dashes cover their (clamped) displacement at constant velocity over a fixed
//! duration; teleports move instantly. Backwards dashes travel opposite the
//! aim.

use bevy::prelude::*;

use crate::simulation::arena::{Arena, DashState};
use crate::simulation::combatant::PlayerId;
use crate::simulation::constants::DASH_DURATION;
use crate::simulation::geometry;
use crate::simulation::skill_config::{DashMode, DashSkill};

#[derive(Clone, Debug)]
pub struct DashHandler {
    /// Every dash resolves over this many ms
    pub duration: f64,
}

impl Default for DashHandler {
    fn default() -> Self {
        Self {
            duration: DASH_DURATION,
        }
    }
}

impl DashHandler {
    /// Start a dash toward (or, for backwards dashes, away from) `direction`.
    pub fn execute_dash(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill: &DashSkill,
        direction: Vec2,
    ) -> bool {
        let now = arena.now;
        let bounds = arena.bounds;
        let Some(player) = arena.player_mut(player_id).filter(|p| p.can_act()) else {
            return false;
        };

        let mut direction = geometry::normalize_or(direction, geometry::DEFAULT_DIRECTION);
        if skill.mode == DashMode::Backwards {
            direction = -direction;
        }

        let origin = player.combatant.position;
        let target = origin + direction * skill.resolved_distance();
        let destination = bounds.clamp_circle(target, player.combatant.radius);

        let duration = self.duration.max(1.0);
        player.dash_state = Some(DashState {
            active: true,
            start_time: now,
            duration,
            origin,
            destination,
            velocity: (destination - origin) / duration as f32,
        });
        true
    }

    /// Move instantly. Unless the skill passes through walls the destination
    /// is clamped into the arena.
    pub fn execute_teleport(
        &self,
        arena: &mut Arena,
        player_id: PlayerId,
        skill: &DashSkill,
        direction: Vec2,
    ) -> bool {
        let bounds = arena.bounds;
        let Some(player) = arena.player_mut(player_id).filter(|p| p.can_act()) else {
            return false;
        };

        let direction = geometry::normalize_or(direction, geometry::DEFAULT_DIRECTION);
        let mut destination = player.combatant.position + direction * skill.resolved_distance();
        if !skill.pass_through_walls {
            destination = bounds.clamp_circle(destination, player.combatant.radius);
        }
        player.combatant.position = destination;
        player.dash_state = None;
        true
    }

    /// Advance an active dash. Returns true while the dash is still moving.
    pub fn update_dash(&self, arena: &mut Arena, player_id: PlayerId) -> bool {
        let now = arena.now;
        let Some(player) = arena.player_mut(player_id) else {
            return false;
        };
        let Some(dash) = player.dash_state.as_ref().filter(|d| d.active) else {
            return false;
        };

        let elapsed = now - dash.start_time;
        if elapsed >= dash.duration {
            player.combatant.position = dash.destination;
            player.dash_state = None;
            return false;
        }

        player.combatant.position = dash.origin + dash.velocity * elapsed as f32;
        true
    }
}
