//! Hostile AI
//!
//! Boss: phase changes by hp fraction, chases the nearest living player until
//! within stopping distance, and rotates through its abilities on their own
//! cooldowns with a minimum gap between uses.
//!
//! Enemies: chase the nearest living player and strike in melee range.

use bevy::prelude::*;

use crate::combat::log::CombatLogEventType;

use super::arena::Arena;
use super::combatant::{Combatant, TargetRef, UnitId};
use super::constants::*;
use super::dispatcher::SkillDispatcher;
use super::entities::{AbilityCore, Projectile};
use super::geometry::{self, ArenaBounds};
use super::skill_config::{AoeDelivery, AoeEffect, AoeSkill, BossAbilityKind};
use super::status_effects::StatusEffects;

const FEL_GREEN: [f32; 3] = [0.4, 1.0, 0.2];

/// Move `combatant` toward `target`, stopping `stop_distance` short of it.
fn chase(combatant: &mut Combatant, target: Vec2, stop_distance: f32, dt_secs: f32, bounds: &ArenaBounds) {
    if !combatant.can_move() {
        return;
    }
    let offset = target - combatant.position;
    let distance = offset.length();
    if distance <= stop_distance {
        return;
    }
    let step = (combatant.speed * dt_secs).min(distance - stop_distance);
    combatant.position += geometry::normalize_or(offset, Vec2::ZERO) * step;
    combatant.position = bounds.clamp_circle(combatant.position, combatant.radius);
}

/// Update phase, movement, abilities and effects of every living boss.
pub fn update_bosses(arena: &mut Arena, dispatcher: &SkillDispatcher, dt_secs: f32) {
    let ids: Vec<UnitId> = arena.bosses.iter().map(|b| b.id).collect();
    for id in ids {
        update_boss(arena, dispatcher, id, dt_secs);
    }
}

fn update_boss(arena: &mut Arena, dispatcher: &SkillDispatcher, id: UnitId, dt_secs: f32) {
    let now = arena.now;
    let bounds = arena.bounds;
    let effects = &dispatcher.effects;

    let Some(index) = arena.bosses.iter().position(|b| b.id == id) else {
        return;
    };
    if !arena.bosses[index].combatant.is_alive() {
        return;
    }

    // Effects first so expired roots and stuns release this tick
    let expired = effects.update_effects(&mut arena.bosses[index].combatant, now);
    for effect in expired {
        let name = arena.bosses[index].combatant.name.clone();
        arena.log.log(
            CombatLogEventType::AuraRemoved,
            format!("{} fades from {}", effect.name, name),
        );
    }

    update_boss_phase(arena, index);

    let boss_position = arena.bosses[index].combatant.position;
    let Some((target_id, target_position, target_radius)) =
        arena.nearest_living_player(boss_position)
    else {
        return;
    };

    chase(
        &mut arena.bosses[index].combatant,
        target_position,
        BOSS_STOP_DISTANCE,
        dt_secs,
        &bounds,
    );

    let boss = &arena.bosses[index];
    if boss.combatant.is_stunned || now < boss.next_ability_at {
        return;
    }
    let Some(ability_index) = boss
        .ability_ready_at
        .iter()
        .position(|ready_at| now >= *ready_at)
    else {
        return;
    };
    let ability = boss.config.abilities[ability_index].clone();

    {
        let boss = &mut arena.bosses[index];
        boss.ability_ready_at[ability_index] = now + ability.cooldown;
        boss.next_ability_at = now + BOSS_ABILITY_GAP;
    }

    let owner = TargetRef::Boss(id);
    let boss_position = arena.bosses[index].combatant.position;
    let boss_radius = arena.bosses[index].combatant.radius;
    arena.log.log(
        CombatLogEventType::AbilityUsed,
        format!("{} uses {}", arena.bosses[index].combatant.name, ability.name),
    );

    match ability.kind {
        BossAbilityKind::Beam => {
            let direction = geometry::normalize_or(target_position - boss_position, geometry::DEFAULT_DIRECTION);
            let core = AbilityCore::new(boss_position, owner, now)
                .with_radius(BOSS_BEAM_RADIUS)
                .with_lifetime(PROJECTILE_LIFETIME)
                .with_color(FEL_GREEN);
            let mut beam = Projectile::new(core, ability.name.clone(), direction * BOSS_BEAM_SPEED, BOSS_BEAM_RANGE);
            beam.damage = ability.damage;
            arena.projectiles.push(beam);
        }
        BossAbilityKind::Burst { radius } => {
            let burst = AoeSkill {
                delivery: AoeDelivery::SelfCentered,
                radius,
                damage: ability.damage,
                heal_amount: 0.0,
                effect: AoeEffect::Damage,
                duration: None,
                tick_rate: None,
            };
            dispatcher
                .aoe
                .detonate(arena, effects, owner, &ability.name, &burst, boss_position, FEL_GREEN);
        }
        BossAbilityKind::Charge => {
            let offset = target_position - boss_position;
            let contact = (offset.length() - boss_radius - target_radius).max(0.0);
            let travel = contact.min(BOSS_DASH_DISTANCE);
            let destination = boss_position + geometry::normalize_or(offset, Vec2::ZERO) * travel;
            arena.bosses[index].combatant.position = bounds.clamp_circle(destination, boss_radius);
            if contact <= BOSS_DASH_DISTANCE {
                arena.apply_damage(effects, owner, TargetRef::Player(target_id), &ability.name, ability.damage);
            }
        }
    }
}

/// Switch to the deepest phase whose threshold the boss's hp has crossed.
fn update_boss_phase(arena: &mut Arena, index: usize) {
    let boss = &mut arena.bosses[index];
    let fraction = boss.combatant.hp_fraction();

    let Some((phase_index, phase)) = boss
        .config
        .phases
        .iter()
        .enumerate()
        .filter(|(_, p)| fraction <= p.hp_threshold)
        .min_by(|a, b| a.1.hp_threshold.total_cmp(&b.1.hp_threshold))
    else {
        return;
    };
    if phase_index == boss.phase {
        return;
    }

    let speed = phase.speed;
    boss.phase = phase_index;
    boss.combatant.base_stats.speed = speed;
    if let Some(original) = boss.combatant.original_stats.as_mut() {
        original.speed = speed;
    }
    boss.combatant.recompute_stats();

    let message = format!("{} enters phase {}", boss.combatant.name, phase_index + 1);
    info!("{}", message);
    arena.log.log(CombatLogEventType::MatchEvent, message);
}

/// Chase and melee for every living enemy.
pub fn update_enemies(arena: &mut Arena, effects: &StatusEffects, dt_secs: f32) {
    let now = arena.now;
    let bounds = arena.bounds;

    for index in 0..arena.enemies.len() {
        if !arena.enemies[index].combatant.is_alive() {
            continue;
        }
        effects.update_effects(&mut arena.enemies[index].combatant, now);

        let position = arena.enemies[index].combatant.position;
        let Some((target_id, target_position, target_radius)) = arena.nearest_living_player(position) else {
            continue;
        };

        let enemy = &mut arena.enemies[index];
        let reach = enemy.attack_range + enemy.combatant.radius + target_radius;
        chase(&mut enemy.combatant, target_position, reach * 0.9, dt_secs, &bounds);

        let in_reach = geometry::distance(enemy.combatant.position, target_position) <= reach;
        if !in_reach || enemy.combatant.is_stunned || now < enemy.next_attack_at {
            continue;
        }
        enemy.next_attack_at = now + enemy.attack_cooldown;
        let (owner, damage) = (TargetRef::Enemy(enemy.id), enemy.damage);
        arena.apply_damage(effects, owner, TargetRef::Player(target_id), "Claw", damage);
    }
}
