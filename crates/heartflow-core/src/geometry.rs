//! Canvas geometry
//!
//! Display space uses the canvas convention: x grows right, y grows down,
//! units are display pixels.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// 2D vector in display space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// A point on the canvas
pub type CanvasPoint = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: &Vec2) -> f32 {
        (*other - *self).length()
    }

    pub fn midpoint(&self, other: &Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn lerp(&self, other: &Vec2, t: f32) -> Vec2 {
        Vec2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Uniformly rescale so the length does not exceed `max`.
    /// Direction is preserved; vectors already within bounds are unchanged.
    pub fn clamp_length(&self, max: f32) -> Vec2 {
        let len = self.length();
        if len > max && len > 0.0 {
            *self * (max / len)
        } else {
            *self
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Linear remap of `value` from [in_min, in_max] to [out_min, out_max].
/// Not clamped; callers clamp where the range is a hard bound.
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_max - in_min).abs() < f32::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_midpoint() {
        let a = Vec2::new(100.0, 200.0);
        let b = Vec2::new(300.0, 240.0);

        assert_eq!(a.midpoint(&b), Vec2::new(200.0, 220.0));
    }

    #[test]
    fn test_clamp_length_preserves_direction() {
        let v = Vec2::new(30.0, 40.0);
        let c = v.clamp_length(10.0);

        assert!((c.length() - 10.0).abs() < 1e-5);
        assert!((c.x - 6.0).abs() < 1e-5);
        assert!((c.y - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_length_within_bounds() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.clamp_length(10.0), v);
        assert_eq!(Vec2::ZERO.clamp_length(1.0), Vec2::ZERO);
    }

    #[test]
    fn test_remap() {
        assert_eq!(remap(0.0, 0.0, 800.0, 0.0001, 0.005), 0.0001);
        assert!((remap(400.0, 0.0, 800.0, 0.0, 1.0) - 0.5).abs() < 1e-6);
        // Reversed output range
        assert_eq!(remap(0.0, 0.0, 100.0, 180.0, 0.0), 180.0);
        assert_eq!(remap(100.0, 0.0, 100.0, 180.0, 0.0), 0.0);
        // Degenerate input range
        assert_eq!(remap(5.0, 1.0, 1.0, 2.0, 3.0), 2.0);
    }

    proptest! {
        #[test]
        fn prop_clamp_length_bounded(x in -1e4f32..1e4, y in -1e4f32..1e4, max in 0.1f32..100.0) {
            let v = Vec2::new(x, y);
            let c = v.clamp_length(max);

            prop_assert!(c.length() <= max * (1.0 + 1e-4));
            // Same direction: the cross product vanishes and the dot product is non-negative
            prop_assert!((v.x * c.y - v.y * c.x).abs() <= 1e-2 * v.length().max(1.0));
            prop_assert!(v.x * c.x + v.y * c.y >= 0.0);
        }

        #[test]
        fn prop_remap_stays_in_output_range(t in 0.0f32..=1.0, lo in -100.0f32..100.0, span in 1.0f32..100.0) {
            let value = remap(t * span + lo, lo, lo + span, 180.0, 0.0);
            prop_assert!((-0.01..=180.01).contains(&value), "{value}");
        }
    }
}
