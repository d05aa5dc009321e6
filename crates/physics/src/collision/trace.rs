//! Query shapes, hit records and the collision oracle seam.
//!
//! The locomotion code never talks to a physics backend directly. It asks a
//! [`CollisionOracle`] to sweep capsules and spheres, cast rays and count
//! overlaps, and gets back plain [`SweepHit`] records.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::LayerMask;

/// Identifier of a collider inside an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// A vertical capsule in world space.
///
/// The capsule is the set of points within `radius` of the segment running
/// from `center - Y * half_segment` to `center + Y * half_segment`. A capsule
/// with `half_segment == 0` is a sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    pub center: Vec3,
    pub half_segment: f32,
    pub radius: f32,
}

impl CapsuleShape {
    /// Build a capsule from its total height (cap to cap).
    pub fn from_height(center: Vec3, height: f32, radius: f32) -> Self {
        Self {
            center,
            half_segment: (height * 0.5 - radius).max(0.0),
            radius,
        }
    }

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            half_segment: 0.0,
            radius,
        }
    }

    /// Center of the upper hemisphere.
    #[inline]
    pub fn top(&self) -> Vec3 {
        self.center + Vec3::Y * self.half_segment
    }

    /// Center of the lower hemisphere.
    #[inline]
    pub fn bottom(&self) -> Vec3 {
        self.center - Vec3::Y * self.half_segment
    }

    /// Total height from the lowest to the highest point.
    #[inline]
    pub fn height(&self) -> f32 {
        2.0 * (self.half_segment + self.radius)
    }

    /// The same capsule moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center + offset,
            ..*self
        }
    }
}

/// What a sweep or ray ran into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepHit {
    /// Contact point on the surface that was hit.
    pub point: Vec3,

    /// Surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,

    /// Distance the shape (or ray) travelled before touching.
    ///
    /// `0.0` means the shape already overlapped the collider at the start.
    pub distance: f32,

    /// Layers of the collider that was hit.
    pub layers: LayerMask,

    pub collider: ColliderId,
}

impl SweepHit {
    /// True if the query started inside the collider.
    #[inline]
    pub fn started_inside(&self) -> bool {
        self.distance <= 0.0
    }
}

/// Synchronous spatial queries against a physics world.
///
/// Queries only consider colliders whose layers intersect `mask`. Directions
/// need not be normalized; a zero direction or non-positive distance yields
/// no hit.
pub trait CollisionOracle {
    /// Sweep a capsule along `direction` for at most `max_distance`.
    fn sweep_capsule(
        &self,
        capsule: CapsuleShape,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit>;

    /// Cast a ray from `origin`.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit>;

    /// Count colliders overlapping the capsule spanned by two sphere centers.
    fn overlap_capsule(&self, top: Vec3, bottom: Vec3, radius: f32, mask: LayerMask) -> usize;

    /// Offset that pushes a penetrating capsule back out of the geometry.
    ///
    /// Oracles that cannot compute penetration depth return zero.
    fn resolve_penetration(&self, _capsule: CapsuleShape, _mask: LayerMask) -> Vec3 {
        Vec3::ZERO
    }

    /// Sweep a sphere along `direction` for at most `max_distance`.
    fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        self.sweep_capsule(CapsuleShape::sphere(origin, radius), direction, max_distance, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capsule_from_height() {
        let capsule = CapsuleShape::from_height(Vec3::new(0.0, 1.0, 0.0), 2.0, 0.5);
        assert!((capsule.half_segment - 0.5).abs() < 0.0001);
        assert!((capsule.top().y - 1.5).abs() < 0.0001);
        assert!((capsule.bottom().y - 0.5).abs() < 0.0001);
        assert!((capsule.height() - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_short_capsule_degenerates_to_sphere() {
        let capsule = CapsuleShape::from_height(Vec3::ZERO, 0.6, 0.5);
        assert_eq!(capsule.half_segment, 0.0);
        assert_eq!(capsule.top(), capsule.bottom());
    }
}
