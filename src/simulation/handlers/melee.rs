//! Melee handler
//!
//! Resolves a cone swing against every living hostile in one pass and leaves a
//! fading swing visual behind, whether or not anything was hit.

use bevy::prelude::*;

use crate::simulation::arena::{Arena, TargetBodies};
use crate::simulation::combatant::{PlayerId, TargetRef};
use crate::simulation::constants::MELEE_VISUAL_LIFETIME;
use crate::simulation::entities::{AbilityCore, MeleeSwing};
use crate::simulation::geometry;
use crate::simulation::skill_config::MeleeSkill;
use crate::simulation::status_effects::StatusEffects;

#[derive(Clone, Debug)]
pub struct MeleeHandler {
    /// How long the swing visual stays in the arena (ms)
    pub visual_lifetime: f64,
}

impl Default for MeleeHandler {
    fn default() -> Self {
        Self {
            visual_lifetime: MELEE_VISUAL_LIFETIME,
        }
    }
}

impl MeleeHandler {
    /// Swing at every hostile inside the cone. Returns the targets hit.
    pub fn execute(
        &self,
        arena: &mut Arena,
        effects: &StatusEffects,
        player_id: PlayerId,
        skill_name: &str,
        skill: &MeleeSkill,
        direction: Vec2,
    ) -> TargetBodies {
        let Some(player) = arena.player(player_id).filter(|p| p.is_alive()) else {
            return TargetBodies::new();
        };
        let origin = player.position();
        let color = player.color;
        let damage = skill.damage * player.combatant.outgoing_damage_multiplier();
        let direction = geometry::normalize_or(direction, geometry::DEFAULT_DIRECTION);

        // Collect hits first, then apply damage
        let hits: TargetBodies = arena
            .hostile_bodies()
            .into_iter()
            .filter(|(_, position, _)| {
                geometry::in_cone(origin, direction, *position, skill.range, skill.angle)
            })
            .collect();

        let owner = TargetRef::Player(player_id);
        for (target, _, _) in &hits {
            arena.apply_damage(effects, owner, *target, skill_name, damage);
        }

        let core = AbilityCore::new(origin, owner, arena.now)
            .with_radius(skill.range)
            .with_lifetime(self.visual_lifetime)
            .with_color(color);
        arena
            .melee_swings
            .push(MeleeSwing::new(core, damage, skill.range, skill.angle, direction));

        debug!("{} hit {} target(s)", skill_name, hits.len());
        hits
    }
}
