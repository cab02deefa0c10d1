//! Ability entities
//!
//! Short-lived objects that live in the arena between ticks:
//! - [`Projectile`]: travels along a velocity until range, bounds or lifetime end it
//! - [`MeleeSwing`]: cone hit-test artifact and fading visual
//! - [`AreaEffect`]: circular detonation, optionally pulsing
//! - [`HealPulse`]: rising heal indicator
//!
//! All of them share [`AbilityCore`] and the [`AbilityEntity`] contract.
//! Lifetime expiry is strict: an entity dies once `now - created_at > lifetime`.

use bevy::math::Vec2;
use smallvec::SmallVec;

use super::combatant::TargetRef;
use super::constants::*;
use super::geometry::{self, ArenaBounds};
use super::skill_config::{AoeSkill, ProjectileEffect};

/// State shared by every ability entity.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityCore {
    pub position: Vec2,
    pub owner: TargetRef,
    pub radius: f32,
    /// RGB in 0.0-1.0
    pub color: [f32; 3],
    /// Creation time in ms
    pub created_at: f64,
    /// Lifetime in ms
    pub lifetime: f64,
    pub is_alive: bool,
}

impl AbilityCore {
    pub fn new(position: Vec2, owner: TargetRef, now: f64) -> Self {
        Self {
            position,
            owner,
            radius: DEFAULT_ENTITY_RADIUS,
            color: [1.0, 1.0, 1.0],
            created_at: now,
            lifetime: DEFAULT_ENTITY_LIFETIME,
            is_alive: true,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f64) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn age(&self, now: f64) -> f64 {
        (now - self.created_at).max(0.0)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.created_at > self.lifetime
    }

    /// Fraction of the lifetime elapsed, in [0, 1].
    pub fn progress(&self, now: f64) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age(now) / self.lifetime).clamp(0.0, 1.0) as f32
    }
}

/// Contract shared by all ability entities.
pub trait AbilityEntity {
    fn core(&self) -> &AbilityCore;
    fn core_mut(&mut self) -> &mut AbilityCore;

    /// Variant-specific per-tick behavior, only called while the entity is unexpired.
    fn advance(&mut self, _now: f64, _dt_secs: f32, _bounds: &ArenaBounds) {}

    /// Advance one tick: expire by lifetime, then run variant behavior.
    fn update(&mut self, now: f64, dt_secs: f32, bounds: &ArenaBounds) {
        if !self.is_alive() {
            return;
        }
        if self.core().is_expired(now) {
            self.destroy();
            return;
        }
        self.advance(now, dt_secs, bounds);
    }

    /// Circle-circle collision against a target body.
    fn check_collision(&self, target_position: Vec2, target_radius: f32) -> bool {
        let core = self.core();
        core.is_alive
            && geometry::circles_overlap(core.position, core.radius, target_position, target_radius)
    }

    fn destroy(&mut self) {
        self.core_mut().is_alive = false;
    }

    fn is_alive(&self) -> bool {
        self.core().is_alive
    }

    fn position(&self) -> Vec2 {
        self.core().position
    }

    fn owner(&self) -> TargetRef {
        self.core().owner
    }
}

// ============================================================================
// Projectile
// ============================================================================

/// What a projectile carries besides its direct effect.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectileRole {
    /// Hits targets directly; may detonate an area where it lands
    Direct { on_impact: Option<AoeSkill> },
    /// Zero-damage carrier of a lobbed area effect, detonates on arrival
    AoeCarrier(AoeSkill),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub core: AbilityCore,
    pub skill_name: String,
    /// Velocity in px/s
    pub velocity: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub heal_amount: f32,
    pub effect: ProjectileEffect,
    pub pierce: bool,
    pub range: f32,
    pub distance_traveled: f32,
    pub role: ProjectileRole,
    /// Targets already struck, so a piercing projectile hits each at most once
    pub hit_targets: SmallVec<[TargetRef; 4]>,
    arrived: bool,
}

impl Projectile {
    pub fn new(core: AbilityCore, skill_name: impl Into<String>, velocity: Vec2, range: f32) -> Self {
        Self {
            core,
            skill_name: skill_name.into(),
            velocity,
            speed: velocity.length(),
            damage: 0.0,
            heal_amount: 0.0,
            effect: ProjectileEffect::Damage,
            pierce: false,
            range,
            distance_traveled: 0.0,
            role: ProjectileRole::Direct { on_impact: None },
            hit_targets: SmallVec::new(),
            arrived: false,
        }
    }

    pub fn is_aoe_carrier(&self) -> bool {
        matches!(self.role, ProjectileRole::AoeCarrier(_))
    }

    /// A carrier that reached its throw distance (or the arena edge).
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    pub fn already_hit(&self, target: TargetRef) -> bool {
        self.hit_targets.contains(&target)
    }

    /// Record a hit. Returns whether the projectile should be destroyed.
    pub fn on_collision(&mut self, target: TargetRef) -> bool {
        if !self.hit_targets.contains(&target) {
            self.hit_targets.push(target);
        }
        !self.pierce
    }

    /// Direction of travel in radians.
    pub fn angle(&self) -> f32 {
        geometry::vector_angle(self.velocity)
    }
}

impl AbilityEntity for Projectile {
    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    fn advance(&mut self, _now: f64, dt_secs: f32, bounds: &ArenaBounds) {
        if self.arrived {
            return;
        }

        let step = self.velocity * dt_secs;
        let step_len = step.length();

        if self.is_aoe_carrier() {
            let remaining = (self.range - self.distance_traveled).max(0.0);
            if step_len >= remaining {
                if step_len > 0.0 {
                    self.core.position += step * (remaining / step_len);
                }
                self.distance_traveled = self.range;
                self.arrived = true;
            } else {
                self.core.position += step;
                self.distance_traveled += step_len;
            }
            if !bounds.contains(self.core.position) {
                self.core.position = bounds.clamp(self.core.position);
                self.arrived = true;
            }
            return;
        }

        self.core.position += step;
        self.distance_traveled += step_len;

        if !bounds.contains(self.core.position) || self.distance_traveled >= self.range {
            self.destroy();
        }
    }
}

// ============================================================================
// Melee swing
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct MeleeSwing {
    pub core: AbilityCore,
    pub damage: f32,
    pub range: f32,
    pub cone_angle: f32,
    /// Unit facing
    pub direction: Vec2,
    /// Facing in radians
    pub angle: f32,
}

impl MeleeSwing {
    pub fn new(core: AbilityCore, damage: f32, range: f32, cone_angle: f32, direction: Vec2) -> Self {
        let direction = geometry::normalize_or(direction, geometry::DEFAULT_DIRECTION);
        Self {
            core,
            damage,
            range,
            cone_angle,
            direction,
            angle: geometry::vector_angle(direction),
        }
    }

    pub fn fade_alpha(&self, now: f64) -> f32 {
        1.0 - self.core.progress(now)
    }
}

impl AbilityEntity for MeleeSwing {
    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    /// Same cone test the melee handler resolves hits with.
    fn check_collision(&self, target_position: Vec2, _target_radius: f32) -> bool {
        self.core.is_alive
            && geometry::in_cone(
                self.core.position,
                self.direction,
                target_position,
                self.range,
                self.cone_angle,
            )
    }
}

// ============================================================================
// Area effect
// ============================================================================

/// Repeating application schedule of a lingering area.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaPulse {
    pub skill: AoeSkill,
    /// ms between applications
    pub interval: f64,
    pub next_at: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AreaEffect {
    pub core: AbilityCore,
    pub skill_name: String,
    pub damage: f32,
    pub heal_amount: f32,
    pub has_dealt_damage: bool,
    pub pulse: Option<AreaPulse>,
}

impl AreaEffect {
    pub fn new(core: AbilityCore, skill_name: impl Into<String>, damage: f32, heal_amount: f32) -> Self {
        Self {
            core,
            skill_name: skill_name.into(),
            damage,
            heal_amount,
            has_dealt_damage: false,
            pulse: None,
        }
    }

    pub fn mark_damage_dealt(&mut self) {
        self.has_dealt_damage = true;
    }

    /// Rendered radius: grows from half to full size over the lifetime.
    pub fn visual_radius(&self, now: f64) -> f32 {
        self.core.radius * (0.5 + 0.5 * self.core.progress(now))
    }

    /// Whether a pulse is due at `now`; advances the schedule when it is.
    pub fn take_due_pulse(&mut self, now: f64) -> bool {
        if !self.core.is_alive {
            return false;
        }
        match self.pulse.as_mut() {
            Some(pulse) if now >= pulse.next_at => {
                pulse.next_at += pulse.interval.max(1.0);
                true
            }
            _ => false,
        }
    }
}

impl AbilityEntity for AreaEffect {
    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    /// One-shot: no further collisions once damage was dealt.
    fn check_collision(&self, target_position: Vec2, target_radius: f32) -> bool {
        self.core.is_alive
            && !self.has_dealt_damage
            && geometry::circles_overlap(
                self.core.position,
                self.core.radius,
                target_position,
                target_radius,
            )
    }
}

// ============================================================================
// Heal pulse
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct HealPulse {
    pub core: AbilityCore,
    pub amount: f32,
}

impl HealPulse {
    pub fn new(position: Vec2, owner: TargetRef, amount: f32, now: f64) -> Self {
        Self {
            core: AbilityCore::new(position, owner, now)
                .with_radius(HEAL_PULSE_RADIUS)
                .with_lifetime(HEAL_PULSE_LIFETIME)
                .with_color([0.2, 1.0, 0.4]),
            amount,
        }
    }

    pub fn fade_alpha(&self, now: f64) -> f32 {
        1.0 - self.core.progress(now)
    }
}

impl AbilityEntity for HealPulse {
    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    fn advance(&mut self, _now: f64, dt_secs: f32, _bounds: &ArenaBounds) {
        self.core.position.y -= HEAL_PULSE_RISE_SPEED * dt_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::combatant::PlayerId;
    use crate::simulation::skill_config::{AoeDelivery, AoeEffect};

    const OWNER: TargetRef = TargetRef::Player(PlayerId(1));

    fn create_test_projectile(velocity: Vec2, range: f32) -> Projectile {
        let core = AbilityCore::new(Vec2::new(100.0, 100.0), OWNER, 0.0)
            .with_lifetime(PROJECTILE_LIFETIME);
        Projectile::new(core, "Test Bolt", velocity, range)
    }

    fn create_test_aoe() -> AoeSkill {
        AoeSkill {
            delivery: AoeDelivery::SelfCentered,
            radius: 80.0,
            damage: 20.0,
            heal_amount: 0.0,
            effect: AoeEffect::Damage,
            duration: None,
            tick_rate: None,
        }
    }

    #[test]
    fn test_lifetime_expiry_is_strict() {
        let bounds = ArenaBounds::default();
        let mut pulse = HealPulse::new(Vec2::new(50.0, 50.0), OWNER, 10.0, 0.0);
        pulse.update(HEAL_PULSE_LIFETIME, 0.016, &bounds);
        assert!(pulse.is_alive(), "alive at exactly its lifetime");
        pulse.update(HEAL_PULSE_LIFETIME + 1.0, 0.016, &bounds);
        assert!(!pulse.is_alive());
    }

    #[test]
    fn test_projectile_dies_at_range() {
        let bounds = ArenaBounds::default();
        let mut p = create_test_projectile(Vec2::new(600.0, 0.0), 100.0);
        p.update(10.0, 0.1, &bounds);
        assert!(p.is_alive());
        assert!((p.distance_traveled - 60.0).abs() < 1e-3);
        p.update(20.0, 0.1, &bounds);
        assert!(!p.is_alive(), "120 traveled >= 100 range");
    }

    #[test]
    fn test_projectile_dies_out_of_bounds() {
        let bounds = ArenaBounds::default();
        let mut p = create_test_projectile(Vec2::new(-2000.0, 0.0), 5000.0);
        p.update(10.0, 0.1, &bounds);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_pierce_decides_destruction() {
        let mut piercing = create_test_projectile(Vec2::X, 100.0);
        piercing.pierce = true;
        let target = TargetRef::Player(PlayerId(2));
        assert!(!piercing.on_collision(target), "piercing projectiles survive a hit");
        assert!(piercing.already_hit(target));

        let mut plain = create_test_projectile(Vec2::X, 100.0);
        assert!(plain.on_collision(target));
    }

    #[test]
    fn test_carrier_stops_exactly_at_range() {
        let bounds = ArenaBounds::default();
        let mut carrier = create_test_projectile(Vec2::new(500.0, 0.0), 120.0);
        carrier.role = ProjectileRole::AoeCarrier(create_test_aoe());
        carrier.update(10.0, 0.2, &bounds);
        assert!(!carrier.has_arrived());
        carrier.update(20.0, 0.2, &bounds);
        assert!(carrier.has_arrived());
        assert!(carrier.is_alive(), "carriers wait for detonation");
        assert!((carrier.position().x - 220.0).abs() < 1e-3);
    }

    #[test]
    fn test_area_effect_is_one_shot() {
        let core = AbilityCore::new(Vec2::new(100.0, 100.0), OWNER, 0.0).with_radius(80.0);
        let mut area = AreaEffect::new(core, "Test Nova", 20.0, 0.0);
        assert!(area.check_collision(Vec2::new(150.0, 100.0), 20.0));
        area.mark_damage_dealt();
        assert!(!area.check_collision(Vec2::new(150.0, 100.0), 20.0));
    }

    #[test]
    fn test_area_visual_radius_grows() {
        let core = AbilityCore::new(Vec2::ZERO, OWNER, 0.0)
            .with_radius(100.0)
            .with_lifetime(AREA_EFFECT_LIFETIME);
        let area = AreaEffect::new(core, "Test", 0.0, 0.0);
        assert_eq!(area.visual_radius(0.0), 50.0);
        assert_eq!(area.visual_radius(AREA_EFFECT_LIFETIME), 100.0);
    }

    #[test]
    fn test_melee_swing_zero_direction_faces_right() {
        let core = AbilityCore::new(Vec2::ZERO, OWNER, 0.0);
        let swing = MeleeSwing::new(core, 10.0, 50.0, 1.0, Vec2::ZERO);
        assert_eq!(swing.direction, Vec2::X);
        assert_eq!(swing.angle, 0.0);
        assert!(swing.check_collision(Vec2::new(30.0, 0.0), 20.0));
        assert!(!swing.check_collision(Vec2::new(-30.0, 0.0), 20.0));
    }

    #[test]
    fn test_fade_alpha_runs_from_opaque_to_clear() {
        let core = AbilityCore::new(Vec2::ZERO, OWNER, 0.0).with_lifetime(200.0);
        let swing = MeleeSwing::new(core, 10.0, 50.0, 1.0, Vec2::X);
        assert_eq!(swing.fade_alpha(0.0), 1.0);
        assert!((swing.fade_alpha(100.0) - 0.5).abs() < 1e-6);
        assert_eq!(swing.fade_alpha(400.0), 0.0, "clamped past the lifetime");

        let pulse = HealPulse::new(Vec2::ZERO, OWNER, 10.0, 0.0);
        assert_eq!(pulse.fade_alpha(0.0), 1.0);
        assert_eq!(pulse.fade_alpha(HEAL_PULSE_LIFETIME), 0.0);
    }

    #[test]
    fn test_heal_pulse_rises() {
        let bounds = ArenaBounds::default();
        let mut pulse = HealPulse::new(Vec2::new(50.0, 50.0), OWNER, 10.0, 0.0);
        pulse.update(100.0, 0.5, &bounds);
        assert!(pulse.position().y < 50.0);
    }
}
