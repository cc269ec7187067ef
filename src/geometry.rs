//! Small 2-D helpers shared by movement, spawning and hit detection.

use bevy::math::Vec2;

/// Axis-aligned box stored as centre plus half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self {
            center,
            half: half.abs(),
        }
    }

    /// Square box of half-width `half`.
    pub fn square(center: Vec2, half: f32) -> Self {
        Self::new(center, Vec2::splat(half))
    }

    /// Strict overlap: boxes that only touch along an edge do not collide.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        d.x < self.half.x + other.half.x && d.y < self.half.y + other.half.y
    }
}

/// Rotate `v` counter-clockwise by `degrees`.
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Normalise `v`, mapping the zero vector (or anything non-finite) to zero.
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Point on the circle of `radius` around `center` at `angle` radians.
#[inline]
pub fn ring_point(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle) * radius
}

/// Clamp `pos` into `[margin, size - margin]` on both axes.
///
/// When the margin is larger than half the world the position collapses to the
/// centre instead of panicking on an inverted range.
pub fn clamp_to_world(pos: Vec2, world: Vec2, margin: f32) -> Vec2 {
    let lo = Vec2::splat(margin).min(world * 0.5);
    let hi = (world - Vec2::splat(margin)).max(world * 0.5);
    pos.clamp(lo, hi)
}
