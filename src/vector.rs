//! Vector helpers shared by the controllers and the physics step.
//!
//! The simulation uses Bevy's `Vec2` as its value type. A handful of
//! operations the gameplay code depends on are not covered by glam with the
//! semantics we need — most importantly, degenerate inputs (zero magnitude,
//! zero divisor) must produce the zero vector, never NaN or infinity, because
//! controller output feeds straight into position updates every frame.

use bevy::math::Vec2;

/// Extra vector operations with zero-safe semantics.
pub trait Vec2Ext {
    /// Scalar division that yields the zero vector when `n` is zero.
    fn div_or_zero(self, n: f32) -> Vec2;

    /// Unit vector pointing from `self` toward `target`; zero when the two
    /// points coincide.
    fn direction_to(self, target: Vec2) -> Vec2;

    /// Angle in degrees via `atan2`, in the range (−180, 180].
    fn angle_degrees(self) -> f32;

    /// Clamps the magnitude to at most `max`, preserving direction.
    fn limit(self, max: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    fn div_or_zero(self, n: f32) -> Vec2 {
        if n == 0.0 {
            Vec2::ZERO
        } else {
            self / n
        }
    }

    fn direction_to(self, target: Vec2) -> Vec2 {
        (target - self).normalize_or_zero()
    }

    fn angle_degrees(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    fn limit(self, max: f32) -> Vec2 {
        if self.length() > max {
            self.normalize_or_zero() * max
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn zero_vector_normalizes_to_zero() {
        let v = Vec2::ZERO.normalize_or_zero();
        assert_eq!(v, Vec2::ZERO);
        assert!(v.x.is_finite() && v.y.is_finite());
    }

    #[test]
    fn division_is_zero_safe() {
        assert_eq!(Vec2::ZERO.div_or_zero(5.0), Vec2::ZERO);
        assert_eq!(Vec2::new(4.0, 2.0).div_or_zero(0.0), Vec2::ZERO);
        assert_eq!(Vec2::new(4.0, 2.0).div_or_zero(2.0), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn magnitude_and_normalization() {
        let v = Vec2::new(3.0, 4.0);
        assert!((v.length() - 5.0).abs() < EPS);

        let n = v.normalize_or_zero();
        assert!((n.x - 0.6).abs() < EPS);
        assert!((n.y - 0.8).abs() < EPS);
    }

    #[test]
    fn direction_to_target() {
        let from = Vec2::new(1.0, 1.0);
        let d = from.direction_to(Vec2::new(4.0, 5.0));
        assert!((d.x - 0.6).abs() < EPS);
        assert!((d.y - 0.8).abs() < EPS);
        assert_eq!(from.direction_to(from), Vec2::ZERO);
    }

    #[test]
    fn angle_in_degrees() {
        assert!((Vec2::new(1.0, 0.0).angle_degrees() - 0.0).abs() < EPS);
        assert!((Vec2::new(0.0, 1.0).angle_degrees() - 90.0).abs() < EPS);
        assert!((Vec2::new(-1.0, 0.0).angle_degrees() - 180.0).abs() < EPS);
        assert!((Vec2::new(0.0, -1.0).angle_degrees() + 90.0).abs() < EPS);
    }

    #[test]
    fn limit_caps_magnitude() {
        let long = Vec2::new(6.0, 8.0).limit(5.0);
        assert!((long.length() - 5.0).abs() < EPS);
        assert!((long.x - 3.0).abs() < EPS);

        let short = Vec2::new(1.0, 1.0);
        assert_eq!(short.limit(5.0), short);
    }
}
