//! Ground, ceiling and headroom probes.
//!
//! All probes are read-only queries against a [`CollisionOracle`]: calling
//! them twice with the same inputs gives the same answer.

use glam::Vec3;

use super::config::LocomotionConfig;
use super::integrator;
use super::state::{ColliderShape, LocomotionState};
use crate::collision::{ColliderId, CollisionOracle, LayerMask, SweepHit};

/// Height above the sweep contact where the normal probe ray starts.
const NORMAL_PROBE_LIFT: f32 = 0.05;

/// What the ground probe found under the capsule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundReport {
    /// Standing on walkable ground.
    pub grounded: bool,

    /// Normal of whatever is below, `Vec3::Y` if nothing is.
    pub normal: Vec3,

    /// Angle between `normal` and up, in degrees.
    pub slope_angle: f32,

    /// Touching ground steeper than the slope limit.
    pub slope_exceeded: bool,

    /// Vertical correction that puts the capsule bottom on the ground. Never positive.
    pub snap_offset: f32,

    /// Layers of the collider below, empty if nothing is.
    pub layers: LayerMask,

    pub collider: Option<ColliderId>,
}

impl GroundReport {
    pub fn airborne() -> Self {
        Self {
            grounded: false,
            normal: Vec3::Y,
            slope_angle: 0.0,
            slope_exceeded: false,
            snap_offset: 0.0,
            layers: LayerMask::NONE,
            collider: None,
        }
    }

    /// Something is below, walkable or not.
    #[inline]
    pub fn touching(&self) -> bool {
        self.collider.is_some()
    }
}

/// Probe for ground below a capsule.
///
/// A sphere of the capsule radius is swept down from the collider center by
/// `height / 2 - radius + ground_check_distance`. The ground normal is taken
/// from a short ray straight down at the contact point, falling back to the
/// sweep normal if the ray misses. Ground steeper than the slope limit, or
/// on a layer outside the ground mask, is not walkable.
///
/// The snap offset is only computed for walkable ground when not rising.
pub fn sense_ground(
    oracle: &dyn CollisionOracle,
    config: &LocomotionConfig,
    position: Vec3,
    collider: &ColliderShape,
    vertical_velocity: f32,
) -> GroundReport {
    let center = collider.center(position);
    let half_height = collider.height * 0.5;
    let reach = (half_height - config.radius).max(0.0) + config.ground_check_distance;

    let Some(hit) = oracle.sweep_sphere(center, config.radius, -Vec3::Y, reach, config.collision_mask)
    else {
        return GroundReport::airborne();
    };

    let normal = ground_normal(oracle, config, &hit);
    let slope_angle = normal.angle_between(Vec3::Y).to_degrees();
    let slope_exceeded = slope_angle > config.slope_limit;
    let walkable_layer = config.ground_mask.intersects(hit.layers);
    let grounded = walkable_layer && !slope_exceeded;

    let snap_offset = if grounded && vertical_velocity <= 0.0 {
        snap_offset(oracle, config, center, half_height)
    } else {
        0.0
    };

    log::trace!(
        "ground probe: hit {:?} slope {:.1} grounded {} snap {:.3}",
        hit.collider,
        slope_angle,
        grounded,
        snap_offset
    );

    GroundReport {
        grounded,
        normal,
        slope_angle,
        slope_exceeded,
        snap_offset,
        layers: hit.layers,
        collider: Some(hit.collider),
    }
}

/// Normal of the surface straight below a sweep contact.
fn ground_normal(oracle: &dyn CollisionOracle, config: &LocomotionConfig, hit: &SweepHit) -> Vec3 {
    let origin = hit.point + Vec3::Y * NORMAL_PROBE_LIFT;
    oracle
        .raycast(
            origin,
            -Vec3::Y,
            NORMAL_PROBE_LIFT + config.ground_check_distance,
            config.collision_mask,
        )
        .map(|ray| ray.normal)
        .unwrap_or(hit.normal)
        .normalize_or(Vec3::Y)
}

/// Downward correction that rests the capsule bottom on the ground.
fn snap_offset(oracle: &dyn CollisionOracle, config: &LocomotionConfig, center: Vec3, half_height: f32) -> f32 {
    let reach = half_height + config.step_offset;
    let Some(feet) = oracle.sweep_sphere(center, config.feet_radius, -Vec3::Y, reach, config.collision_mask)
    else {
        return 0.0;
    };

    // Where the lower hemisphere would sit if it rested on the contact.
    let rest = feet.point + feet.normal * config.radius;
    let target_center_y = rest.y + (half_height - config.radius).max(0.0);
    (target_center_y - center.y).min(0.0)
}

/// Probe for a ceiling above a capsule, mirroring the ground probe.
pub fn sense_ceiling(
    oracle: &dyn CollisionOracle,
    config: &LocomotionConfig,
    position: Vec3,
    collider: &ColliderShape,
) -> Option<SweepHit> {
    let center = collider.center(position);
    let reach = (collider.height * 0.5 - config.radius).max(0.0) + config.ground_check_distance;
    oracle.sweep_sphere(center, config.radius, Vec3::Y, reach, config.collision_mask)
}

/// Apply a ceiling contact through the one-shot latch.
///
/// The first contact after the latch was armed removes the velocity
/// component pointing into the ceiling and disarms the latch. Returns true
/// if the velocity was changed.
pub fn resolve_ceiling(state: &mut LocomotionState, hit: Option<SweepHit>) -> bool {
    let Some(hit) = hit else {
        return false;
    };
    if !state.can_hit_ceiling {
        return false;
    }

    state.can_hit_ceiling = false;
    let before = state.velocity;
    integrator::clip_into_surface(&mut state.velocity, hit.normal);
    log::debug!("ceiling contact, velocity {:?} -> {:?}", before, state.velocity);
    before != state.velocity
}

/// Whether a standing capsule fits at `position`.
///
/// A sphere is swept from the bottom hemisphere center of the standing
/// capsule up to its top hemisphere center.
pub fn can_uncrouch(oracle: &dyn CollisionOracle, config: &LocomotionConfig, position: Vec3) -> bool {
    let inner = (config.standing_collider_height * 0.5 - config.radius).max(0.0);
    let origin = position - Vec3::Y * inner;
    let radius = (config.radius - config.skin_width).max(0.01);

    oracle
        .sweep_sphere(origin, radius, Vec3::Y, 2.0 * inner, config.collision_mask)
        .is_none()
}

/// Whether the standing capsule can be restored in the air without
/// overlapping anything.
pub fn can_uncrouch_air(oracle: &dyn CollisionOracle, config: &LocomotionConfig, position: Vec3) -> bool {
    let inner = (config.standing_collider_height * 0.5 - config.radius).max(0.0);
    let radius = (config.radius - config.skin_width).max(0.01);

    oracle.overlap_capsule(
        position + Vec3::Y * inner,
        position - Vec3::Y * inner,
        radius,
        config.collision_mask,
    ) == 0
}
