//! Collision world containing all static and kinematic geometry.
//!
//! The world stores box brushes and answers [`CollisionOracle`] queries
//! against them through parry3d.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{contact, Contact, Ray, RayCast};
use parry3d::shape::SharedShape;

use super::flags::LayerMask;
use super::trace::{CapsuleShape, ColliderId, CollisionOracle, SweepHit};

/// Binary search refinement steps after the coarse pass (~0.025% precision).
const REFINE_ITERATIONS: usize = 12;

/// Smallest coarse step along a sweep.
const MIN_SWEEP_STEP: f32 = 0.01;

/// Upper bound on coarse samples for a single sweep.
const MAX_SWEEP_SAMPLES: usize = 128;

/// Extra distance added when pushing a shape out of solid geometry.
const PENETRATION_MARGIN: f32 = 0.001;

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    pub id: ColliderId,
    pub shape: SharedShape,
    /// Center of the brush in world space.
    pub center: Vec3,
    pub rotation: Quat,
    pub layers: LayerMask,
    /// Kinematic brushes may be moved between frames.
    pub kinematic: bool,
    transform: Isometry<Real>,
}

impl CollisionBrush {
    fn new(id: ColliderId, shape: SharedShape, center: Vec3, rotation: Quat, layers: LayerMask) -> Self {
        Self {
            id,
            shape,
            center,
            rotation,
            layers,
            kinematic: false,
            transform: isometry(center, rotation),
        }
    }
}

/// The collision world containing all geometry.
///
/// Supports axis-aligned boxes, oriented boxes (ramps) and kinematic boxes
/// (platforms) that are moved with [`CollisionWorld::set_brush_center`].
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `layers` - Layers the box lives on
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, layers: LayerMask) -> ColliderId {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY, layers)
    }

    /// Add a rotated box, typically a ramp.
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        layers: LayerMask,
    ) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;

        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.brushes
            .push(CollisionBrush::new(id, shape, center, rotation, layers));

        id
    }

    /// Add a box that can be moved every frame.
    pub fn add_kinematic_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        layers: LayerMask,
    ) -> ColliderId {
        let id = self.add_box(center, half_extents, layers);
        if let Some(brush) = self.brush_mut(id) {
            brush.kinematic = true;
        }
        id
    }

    /// Move a brush. Returns false if the id is unknown.
    pub fn set_brush_center(&mut self, id: ColliderId, center: Vec3) -> bool {
        match self.brush_mut(id) {
            Some(brush) => {
                brush.center = center;
                brush.transform = isometry(center, brush.rotation);
                true
            }
            None => false,
        }
    }

    pub fn brush(&self, id: ColliderId) -> Option<&CollisionBrush> {
        self.brushes.iter().find(|b| b.id == id)
    }

    fn brush_mut(&mut self, id: ColliderId) -> Option<&mut CollisionBrush> {
        self.brushes.iter_mut().find(|b| b.id == id)
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.brushes.clear();
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Check whether a capsule penetrates any geometry on `mask`.
    pub fn capsule_in_solid(&self, capsule: CapsuleShape, mask: LayerMask) -> bool {
        let shape = SharedShape::capsule_y(capsule.half_segment, capsule.radius);
        self.deepest_contact(&shape, capsule.center, mask).is_some()
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// Deepest penetrating contact for `shape` placed at `position`.
    ///
    /// Exactly touching (zero distance) does not count as penetration.
    fn deepest_contact(
        &self,
        shape: &SharedShape,
        position: Vec3,
        mask: LayerMask,
    ) -> Option<(&CollisionBrush, Contact)> {
        let test_transform = Isometry::translation(position.x, position.y, position.z);
        let mut deepest: Option<(&CollisionBrush, Contact)> = None;

        for brush in &self.brushes {
            if !mask.intersects(brush.layers) {
                continue;
            }

            if let Ok(Some(c)) = contact(
                &test_transform,
                shape.as_ref(),
                &brush.transform,
                brush.shape.as_ref(),
                0.0,
            ) {
                if c.dist < 0.0 && deepest.as_ref().map_or(true, |(_, d)| c.dist < d.dist) {
                    deepest = Some((brush, c));
                }
            }
        }

        deepest
    }

    /// Sweep by coarse stepping, then refine the first blocked interval with
    /// a binary search.
    fn sweep_shape(
        &self,
        shape: &SharedShape,
        start: Vec3,
        step_hint: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || !(max_distance > 0.0) {
            return None;
        }

        if let Some((brush, c)) = self.deepest_contact(shape, start, mask) {
            return Some(hit_from_contact(brush, &c, 0.0));
        }

        let step = step_hint.max(MIN_SWEEP_STEP);
        let samples = ((max_distance / step).ceil() as usize).clamp(1, MAX_SWEEP_SAMPLES);

        let mut lo = 0.0_f32;
        let mut hi = None;
        for i in 1..=samples {
            let t = max_distance * i as f32 / samples as f32;
            if self.deepest_contact(shape, start + dir * t, mask).is_some() {
                hi = Some(t);
                break;
            }
            lo = t;
        }
        let mut hi = hi?;

        for _ in 0..REFINE_ITERATIONS {
            let mid = (lo + hi) * 0.5;
            if self.deepest_contact(shape, start + dir * mid, mask).is_some() {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let (brush, c) = self.deepest_contact(shape, start + dir * hi, mask)?;
        Some(hit_from_contact(brush, &c, lo))
    }
}

impl CollisionOracle for CollisionWorld {
    fn sweep_capsule(
        &self,
        capsule: CapsuleShape,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        let shape = if capsule.half_segment > 0.0 {
            SharedShape::capsule_y(capsule.half_segment, capsule.radius)
        } else {
            SharedShape::ball(capsule.radius)
        };
        self.sweep_shape(
            &shape,
            capsule.center,
            capsule.radius * 0.5,
            direction,
            max_distance,
            mask,
        )
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SweepHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || !(max_distance > 0.0) {
            return None;
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut closest: Option<(f32, &CollisionBrush)> = None;
        for brush in &self.brushes {
            if !mask.intersects(brush.layers) {
                continue;
            }

            if let Some(toi) = brush.shape.cast_ray(&brush.transform, &ray, max_distance, true) {
                if toi <= max_distance && closest.map_or(true, |(best, _)| toi < best) {
                    closest = Some((toi, brush));
                }
            }
        }

        let (toi, brush) = closest?;
        let normal = brush
            .shape
            .cast_ray_and_get_normal(&brush.transform, &ray, toi + 0.01, true)
            .map(|i| Vec3::new(i.normal.x, i.normal.y, i.normal.z))
            .unwrap_or(-dir);

        Some(SweepHit {
            point: origin + dir * toi,
            normal,
            distance: toi,
            layers: brush.layers,
            collider: brush.id,
        })
    }

    fn resolve_penetration(&self, capsule: CapsuleShape, mask: LayerMask) -> Vec3 {
        let shape = SharedShape::capsule_y(capsule.half_segment, capsule.radius);
        let test_transform =
            Isometry::translation(capsule.center.x, capsule.center.y, capsule.center.z);

        let mut correction = Vec3::ZERO;
        for brush in &self.brushes {
            if !mask.intersects(brush.layers) {
                continue;
            }

            if let Ok(Some(c)) = contact(
                &test_transform,
                shape.as_ref(),
                &brush.transform,
                brush.shape.as_ref(),
                0.0,
            ) {
                // Push out along the brush normal by the penetration depth
                let depth = -c.dist;
                if depth > 0.0 {
                    let normal = Vec3::new(c.normal2.x, c.normal2.y, c.normal2.z);
                    correction += normal * (depth + PENETRATION_MARGIN);
                }
            }
        }

        correction
    }

    fn overlap_capsule(&self, top: Vec3, bottom: Vec3, radius: f32, mask: LayerMask) -> usize {
        let shape = SharedShape::capsule(
            Point::new(bottom.x, bottom.y, bottom.z),
            Point::new(top.x, top.y, top.z),
            radius,
        );
        let identity = Isometry::identity();

        self.brushes
            .iter()
            .filter(|brush| mask.intersects(brush.layers))
            .filter(|brush| {
                matches!(
                    contact(&identity, shape.as_ref(), &brush.transform, brush.shape.as_ref(), 0.0),
                    Ok(Some(c)) if c.dist < 0.0
                )
            })
            .count()
    }
}

fn isometry(center: Vec3, rotation: Quat) -> Isometry<Real> {
    let (axis, angle) = rotation.to_axis_angle();
    let scaled = axis * angle;
    Isometry::new(
        Vector::new(center.x, center.y, center.z),
        Vector::new(scaled.x, scaled.y, scaled.z),
    )
}

fn hit_from_contact(brush: &CollisionBrush, c: &Contact, distance: f32) -> SweepHit {
    SweepHit {
        point: Vec3::new(c.point2.x, c.point2.y, c.point2.z),
        normal: Vec3::new(c.normal2.x, c.normal2.y, c.normal2.z),
        distance,
        layers: brush.layers,
        collider: brush.id,
    }
}

// ============================================================================
// Tests
// ============================================================================
