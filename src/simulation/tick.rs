//! Per-tick simulation pipeline
//!
//! One call to [`step`] runs, in order:
//! 1. actor state machines (movement, cast, shield, dash, effects), revives,
//!    hostile AI
//! 2. ability entity updates, culling by lifetime, bounds and range
//! 3. collision resolution (projectiles, carrier arrivals, pulsing areas)
//! 4. culling of entities destroyed during collisions, death sweep

use bevy::prelude::*;

use crate::combat::log::CombatLogEventType;

use super::ai;
use super::arena::Arena;
use super::combatant::{PlayerId, TargetRef};
use super::dispatcher::SkillDispatcher;
use super::entities::{AbilityEntity, Projectile, ProjectileRole};
use super::geometry;
use super::skill_config::ProjectileEffect;

/// Advance the whole simulation by `dt_ms`.
pub fn step(arena: &mut Arena, dispatcher: &SkillDispatcher, dt_ms: f64) {
    arena.advance_clock(dt_ms);
    let dt_secs = (dt_ms.max(0.0) / 1000.0) as f32;

    advance_actor_states(arena, dispatcher, dt_secs);
    advance_ability_entities(arena, dt_secs);
    resolve_collisions(arena, dispatcher);
    cull_destroyed_entities(arena, dispatcher);
}

// ============================================================================
// Phase 1: actors
// ============================================================================

pub fn advance_actor_states(arena: &mut Arena, dispatcher: &SkillDispatcher, dt_secs: f32) {
    let ids: Vec<PlayerId> = arena.players.iter().map(|p| p.id).collect();
    for id in ids {
        advance_player(arena, dispatcher, id, dt_secs);
    }

    arena.process_revive_requests(&dispatcher.effects);

    ai::update_bosses(arena, dispatcher, dt_secs);
    ai::update_enemies(arena, &dispatcher.effects, dt_secs);
}

fn advance_player(arena: &mut Arena, dispatcher: &SkillDispatcher, id: PlayerId, dt_secs: f32) {
    let now = arena.now;
    let bounds = arena.bounds;

    let Some(player) = arena.player_mut(id) else {
        return;
    };
    if !player.is_alive() {
        return;
    }

    // Movement from input; dashes drive position on their own
    if !player.is_dashing() && player.combatant.can_move() && player.move_input != Vec2::ZERO {
        let direction = geometry::normalize_or(player.move_input, Vec2::ZERO);
        let speed = player.combatant.speed;
        player.combatant.position += direction * speed * dt_secs;
        player.combatant.position =
            bounds.clamp_circle(player.combatant.position, player.combatant.radius);
    }

    if dispatcher.cast.update_cast(arena, id) {
        dispatcher.complete_cast(arena, id);
    }
    dispatcher.shield.update(arena, id);
    dispatcher.dash.update_dash(arena, id);

    let Some(player) = arena.player_mut(id) else {
        return;
    };
    let expired = dispatcher.effects.update_effects(&mut player.combatant, now);
    player.combatant.position =
        bounds.clamp_circle(player.combatant.position, player.combatant.radius);

    if !expired.is_empty() {
        let name = player.combatant.name.clone();
        for effect in expired {
            arena.log.log(
                CombatLogEventType::AuraRemoved,
                format!("{} fades from {}", effect.name, name),
            );
        }
    }
}

// ============================================================================
// Phase 2: entity updates
// ============================================================================

pub fn advance_ability_entities(arena: &mut Arena, dt_secs: f32) {
    let now = arena.now;
    let bounds = arena.bounds;

    for projectile in &mut arena.projectiles {
        projectile.update(now, dt_secs, &bounds);
    }
    for swing in &mut arena.melee_swings {
        swing.update(now, dt_secs, &bounds);
    }
    for area in &mut arena.area_effects {
        area.update(now, dt_secs, &bounds);
    }
    for pulse in &mut arena.heal_pulses {
        pulse.update(now, dt_secs, &bounds);
    }

    retain_alive(arena);
}

// ============================================================================
// Phase 3: collisions
// ============================================================================

pub fn resolve_collisions(arena: &mut Arena, dispatcher: &SkillDispatcher) {
    // Take the list so handlers can mutate the arena while we iterate
    let mut projectiles = std::mem::take(&mut arena.projectiles);
    for projectile in projectiles.iter_mut().filter(|p| p.is_alive()) {
        resolve_projectile(arena, dispatcher, projectile);
    }
    projectiles.append(&mut arena.projectiles);
    arena.projectiles = projectiles;

    let now = arena.now;
    let mut areas = std::mem::take(&mut arena.area_effects);
    for area in areas.iter_mut() {
        if !area.take_due_pulse(now) {
            continue;
        }
        if let Some(pulse) = area.pulse.as_ref() {
            dispatcher.aoe.apply_area(
                arena,
                &dispatcher.effects,
                area.core.owner,
                &area.skill_name,
                &pulse.skill,
                area.core.position,
            );
        }
    }
    areas.append(&mut arena.area_effects);
    arena.area_effects = areas;
}

fn resolve_projectile(arena: &mut Arena, dispatcher: &SkillDispatcher, projectile: &mut Projectile) {
    let owner = projectile.owner();
    let position = projectile.position();

    if let ProjectileRole::AoeCarrier(skill) = &projectile.role {
        if projectile.has_arrived() {
            dispatcher.aoe.on_projectile_impact(
                arena,
                &dispatcher.effects,
                owner,
                &projectile.skill_name,
                skill,
                position,
            );
            projectile.destroy();
        }
        return;
    }

    let candidates = match projectile.effect {
        ProjectileEffect::Damage => arena.foes_of(owner),
        ProjectileEffect::Heal => arena
            .allies_of(owner)
            .into_iter()
            .filter(|(target, _, _)| *target != owner)
            .collect(),
    };

    for (target, target_position, target_radius) in candidates {
        if projectile.already_hit(target)
            || !projectile.check_collision(target_position, target_radius)
        {
            continue;
        }

        if let TargetRef::Player(player_id) = target {
            if owner.is_hostile() {
                let blocked = arena
                    .player(player_id)
                    .is_some_and(|p| dispatcher.shield.is_blocked(p, position));
                if blocked {
                    let name = arena.display_name(target);
                    arena.log.log(
                        CombatLogEventType::AbilityUsed,
                        format!("{} blocks {}", name, projectile.skill_name),
                    );
                    projectile.destroy();
                    return;
                }
            }
        }

        match projectile.effect {
            ProjectileEffect::Damage => {
                arena.apply_damage(
                    &dispatcher.effects,
                    owner,
                    target,
                    &projectile.skill_name,
                    projectile.damage,
                );
            }
            ProjectileEffect::Heal => {
                arena.apply_healing(
                    &dispatcher.effects,
                    owner,
                    target,
                    &projectile.skill_name,
                    projectile.heal_amount,
                );
            }
        }

        if let ProjectileRole::Direct {
            on_impact: Some(skill),
        } = &projectile.role
        {
            dispatcher.aoe.on_projectile_impact(
                arena,
                &dispatcher.effects,
                owner,
                &projectile.skill_name,
                skill,
                position,
            );
        }

        if projectile.on_collision(target) {
            projectile.destroy();
            return;
        }
    }
}

// ============================================================================
// Phase 4: cleanup
// ============================================================================

pub fn cull_destroyed_entities(arena: &mut Arena, dispatcher: &SkillDispatcher) {
    retain_alive(arena);
    arena.enemies.retain(|e| e.combatant.is_alive());
    arena.sweep_player_deaths(&dispatcher.effects);
}

fn retain_alive(arena: &mut Arena) {
    arena.projectiles.retain(|p| p.is_alive());
    arena.melee_swings.retain(|s| s.is_alive());
    arena.area_effects.retain(|a| a.is_alive());
    arena.heal_pulses.retain(|h| h.is_alive());
}
