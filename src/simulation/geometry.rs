//! Geometry and collision primitives
//!
//! Pure functions shared by every ability archetype:
//! - Euclidean distance and circle-circle overlap
//! - Cone membership (melee swings)
//! - Arc membership (directional shields)
//! - Angle wrapping and vector normalization
//!
//! All comparisons on boundaries are strict: a target exactly at `r1 + r2`
//! does not collide, a target exactly at `range` is outside a cone.

use bevy::math::Vec2;
use std::f32::consts::{PI, TAU};

use super::constants::{ARENA_HEIGHT, ARENA_WIDTH};

/// Direction used when an aim vector is zero or missing.
pub const DEFAULT_DIRECTION: Vec2 = Vec2::X;

/// Euclidean distance between two points.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Circle-circle overlap test with a strict boundary.
///
/// Coincident centers always collide, even for zero radii.
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let d = distance(a, b);
    d == 0.0 || d < a_radius + b_radius
}

/// Point-in-circle test with a strict boundary (used by area effects).
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    distance(center, point) < radius
}

/// Wrap an angle into [-PI, PI] by repeated +/- 2PI steps.
///
/// Non-finite input maps to 0 so callers never loop forever.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle;
    while a > PI {
        a -= TAU;
    }
    while a < -PI {
        a += TAU;
    }
    a
}

/// Absolute angular difference in [0, PI].
pub fn angle_difference(a: f32, b: f32) -> f32 {
    wrap_angle(a - b).abs()
}

/// Angle of a vector, 0 for the zero vector.
pub fn vector_angle(v: Vec2) -> f32 {
    if v == Vec2::ZERO {
        0.0
    } else {
        v.y.atan2(v.x)
    }
}

/// Normalize a vector, falling back to `fallback` for zero or non-finite input.
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

/// Unit vector for an angle.
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Cone membership test.
///
/// The target is inside when its distance is at most `range` and the angular
/// difference between the facing and the bearing to the target is strictly
/// less than half of `cone_angle`. A target sitting on the origin is inside.
pub fn in_cone(origin: Vec2, facing: Vec2, target: Vec2, range: f32, cone_angle: f32) -> bool {
    let d = distance(origin, target);
    if d > range {
        return false;
    }
    if d == 0.0 {
        return true;
    }
    let facing_angle = vector_angle(facing);
    let target_angle = vector_angle(target - origin);
    angle_difference(target_angle, facing_angle) < cone_angle / 2.0
}

/// Arc membership test: is `point` within `arc / 2` of the facing angle, as
/// seen from `origin`? Distance is ignored.
pub fn in_arc(origin: Vec2, facing_angle: f32, point: Vec2, arc: f32) -> bool {
    let bearing = vector_angle(point - origin);
    angle_difference(bearing, facing_angle) < arc / 2.0
}

/// Playable rectangle, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl ArenaBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Clamp a point into the arena.
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    /// Clamp a circle's center so the whole circle stays inside.
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let r = radius.max(0.0);
        let min = Vec2::splat(r).min(self.center());
        let max = Vec2::new(self.width - r, self.height - r).max(self.center());
        center.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_circle_boundary_is_strict() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(30.0, 0.0);
        assert!(!circles_overlap(a, 10.0, b, 20.0), "exactly r1 + r2 apart must not collide");
        assert!(circles_overlap(a, 10.0, Vec2::new(29.9, 0.0), 20.0));
    }

    #[test]
    fn test_coincident_centers_always_collide() {
        let p = Vec2::new(5.0, 5.0);
        assert!(circles_overlap(p, 0.0, p, 0.0));
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-4);
        assert!((wrap_angle(-3.0 * PI) + PI).abs() < 1e-4);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(wrap_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_angle_difference_across_seam() {
        let diff = angle_difference(PI - 0.1, -PI + 0.1);
        assert!((diff - 0.2).abs() < 1e-4, "difference across +/-PI should be small, got {}", diff);
    }

    #[test]
    fn test_normalize_zero_vector_uses_fallback() {
        assert_eq!(normalize_or(Vec2::ZERO, DEFAULT_DIRECTION), Vec2::X);
        let n = normalize_or(Vec2::new(3.0, 4.0), DEFAULT_DIRECTION);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cone_range_is_inclusive() {
        let origin = Vec2::ZERO;
        assert!(in_cone(origin, Vec2::X, Vec2::new(80.0, 0.0), 80.0, FRAC_PI_2));
        assert!(!in_cone(origin, Vec2::X, Vec2::new(80.1, 0.0), 80.0, FRAC_PI_2));
    }

    #[test]
    fn test_cone_edge_angle_is_excluded() {
        let origin = Vec2::ZERO;
        // 45 degrees off a 90 degree cone sits exactly on the edge
        assert!(!in_cone(origin, Vec2::X, Vec2::new(50.0, 50.0), 80.0, FRAC_PI_2));
        let inside = direction_from_angle(PI / 4.0 - 0.01) * 50.0;
        assert!(in_cone(origin, Vec2::X, inside, 80.0, FRAC_PI_2));
    }

    #[test]
    fn test_cone_is_symmetric_about_facing() {
        let origin = Vec2::new(100.0, 100.0);
        let facing = Vec2::new(1.0, 1.0);
        let base = vector_angle(facing);
        for offset in [0.1_f32, 0.3, 0.5, 0.7, 0.9] {
            let left = origin + direction_from_angle(base + offset) * 40.0;
            let right = origin + direction_from_angle(base - offset) * 40.0;
            assert_eq!(
                in_cone(origin, facing, left, 80.0, PI / 3.0),
                in_cone(origin, facing, right, 80.0, PI / 3.0),
                "cone test must be symmetric at offset {}",
                offset
            );
        }
    }

    #[test]
    fn test_bounds_clamp_circle() {
        let bounds = ArenaBounds::default();
        let clamped = bounds.clamp_circle(Vec2::new(-50.0, 2000.0), 20.0);
        assert_eq!(clamped, Vec2::new(20.0, ARENA_HEIGHT - 20.0));
        assert!(bounds.contains(Vec2::new(0.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(-0.1, 10.0)));
    }

    #[test]
    fn test_arc_membership() {
        let origin = Vec2::ZERO;
        assert!(in_arc(origin, 0.0, Vec2::new(100.0, 10.0), FRAC_PI_2));
        assert!(!in_arc(origin, 0.0, Vec2::new(-100.0, 0.0), FRAC_PI_2));
    }
}
