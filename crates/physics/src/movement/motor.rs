//! Capsule motor: moves a capsule through the world by a displacement.
//!
//! This is the classic slide move. The capsule is swept along what is left
//! of the displacement, stops a skin width short of whatever it hits, clips
//! the remainder against every plane touched so far and tries again. When a
//! grounded capsule is blocked by a wall it also tries stepping up onto it.

use glam::Vec3;

use crate::collision::{CapsuleShape, CollisionOracle, LayerMask};

use super::config::LocomotionConfig;
use super::state::CollisionFlags;

/// Maximum number of collision planes to track during one move.
pub const MAX_CLIP_PLANES: usize = 5;

/// Displacements shorter than this are not worth a sweep.
const MIN_MOVE_DISTANCE: f32 = 1e-5;

/// Step results must beat the direct move by this much horizontally.
const STEP_GAIN_EPSILON: f32 = 1e-3;

/// Motor tunables derived from a [`LocomotionConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorSettings {
    pub skin_width: f32,
    pub step_offset: f32,
    /// Smallest normal Y component that counts as walkable.
    pub min_walk_normal: f32,
    pub mask: LayerMask,
}

impl MotorSettings {
    pub fn from_config(config: &LocomotionConfig) -> Self {
        Self {
            skin_width: config.skin_width,
            step_offset: config.step_offset,
            min_walk_normal: config.slope_limit.to_radians().cos(),
            mask: config.collision_mask,
        }
    }
}

/// Result of a capsule move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveResult {
    /// Displacement actually applied to the capsule.
    pub offset: Vec3,
    /// Sides touched during the move.
    pub flags: CollisionFlags,
    /// Normals of every surface hit, in order.
    pub normals: Vec<Vec3>,
    /// True if the move went up a step.
    pub stepped: bool,
}

impl MoveResult {
    fn record(&mut self, normal: Vec3) {
        self.flags.set(CollisionFlags::from_normal(normal), true);
        self.normals.push(normal);
    }
}

/// Clip a vector against a surface normal.
///
/// Removes the component going into the surface and optionally adds a small
/// "overbounce" to prevent sticking.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);

    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };

    velocity - normal * adjusted_backoff
}

/// Slide a capsule along `displacement`, clipping against what it touches.
///
/// A capsule that starts inside geometry is first pushed out with
/// [`CollisionOracle::resolve_penetration`].
pub fn slide_move(
    oracle: &dyn CollisionOracle,
    capsule: CapsuleShape,
    displacement: Vec3,
    settings: &MotorSettings,
) -> MoveResult {
    let mut result = MoveResult::default();
    let start = capsule.center;

    let mut center = start + oracle.resolve_penetration(capsule, settings.mask);
    let mut remaining = displacement;
    let mut planes: [Vec3; MAX_CLIP_PLANES] = [Vec3::ZERO; MAX_CLIP_PLANES];
    let mut num_planes = 0;

    for _ in 0..MAX_CLIP_PLANES {
        let distance = remaining.length();
        if distance < MIN_MOVE_DISTANCE {
            break;
        }
        let direction = remaining / distance;

        let moving = CapsuleShape { center, ..capsule };
        let Some(hit) = oracle.sweep_capsule(
            moving,
            direction,
            distance + settings.skin_width,
            settings.mask,
        ) else {
            center += remaining;
            break;
        };

        // Stop a skin width short of the contact
        let travel = (hit.distance - settings.skin_width).clamp(0.0, distance);
        center += direction * travel;
        result.record(hit.normal);

        let leftover = remaining * (1.0 - travel / distance);

        if num_planes < MAX_CLIP_PLANES {
            planes[num_planes] = hit.normal;
            num_planes += 1;
        }

        remaining = clip_against_planes(leftover, &planes[..num_planes]);
    }

    result.offset = center - start;
    result
}

/// Find a direction that does not go into any of `planes`.
fn clip_against_planes(delta: Vec3, planes: &[Vec3]) -> Vec3 {
    for (i, plane) in planes.iter().enumerate() {
        let clipped = clip_velocity(delta, *plane, 1.0);

        let valid = planes
            .iter()
            .enumerate()
            .all(|(j, other)| i == j || clipped.dot(*other) >= -0.01);
        if valid {
            return clipped;
        }
    }

    // Wedged between planes: slide along the crease of the first two
    if planes.len() >= 2 {
        let crease = planes[0].cross(planes[1]).normalize_or_zero();
        let along = crease * delta.dot(crease);
        if along.dot(planes[0]) >= -0.01 && along.dot(planes[1]) >= -0.01 {
            return along;
        }
    }

    Vec3::ZERO
}

/// Slide move that also tries to step up onto low obstacles.
///
/// The step is attempted only for a grounded capsule whose direct move was
/// blocked at the sides. The capsule is lifted by the step offset, slid
/// horizontally and dropped back down; the stepped result is used only if it
/// lands on walkable ground and gets further horizontally than the direct
/// move.
pub fn step_slide_move(
    oracle: &dyn CollisionOracle,
    capsule: CapsuleShape,
    displacement: Vec3,
    settings: &MotorSettings,
    grounded: bool,
) -> MoveResult {
    let direct = slide_move(oracle, capsule, displacement, settings);

    if !grounded || settings.step_offset <= 0.0 || !direct.flags.has(CollisionFlags::SIDES) {
        return direct;
    }

    let horizontal = Vec3::new(displacement.x, 0.0, displacement.z);
    if horizontal.length_squared() < MIN_MOVE_DISTANCE * MIN_MOVE_DISTANCE {
        return direct;
    }

    // Up
    let lift = oracle
        .sweep_capsule(capsule, Vec3::Y, settings.step_offset + settings.skin_width, settings.mask)
        .map_or(settings.step_offset, |hit| {
            (hit.distance - settings.skin_width).clamp(0.0, settings.step_offset)
        });
    if lift <= settings.skin_width {
        return direct;
    }
    let raised = capsule.translated(Vec3::Y * lift);

    // Across
    let across = slide_move(oracle, raised, horizontal, settings);
    let moved = raised.translated(across.offset);

    // Down
    let drop = lift + settings.skin_width - displacement.y.min(0.0);
    let Some(landing) =
        oracle.sweep_capsule(moved, -Vec3::Y, drop + settings.skin_width, settings.mask)
    else {
        return direct;
    };
    if landing.normal.y < settings.min_walk_normal {
        return direct;
    }
    let settle = (landing.distance - settings.skin_width).clamp(0.0, drop);
    let stepped_offset = moved.center - Vec3::Y * settle - capsule.center;

    let direct_gain = Vec3::new(direct.offset.x, 0.0, direct.offset.z).length();
    let stepped_gain = Vec3::new(stepped_offset.x, 0.0, stepped_offset.z).length();
    if stepped_gain <= direct_gain + STEP_GAIN_EPSILON {
        return direct;
    }

    log::trace!(
        "stepped up {:.3}, gain {:.3} over {:.3}",
        stepped_offset.y,
        stepped_gain,
        direct_gain
    );

    let mut result = MoveResult {
        offset: stepped_offset,
        stepped: true,
        ..Default::default()
    };
    for normal in across.normals {
        result.record(normal);
    }
    result.record(landing.normal);
    result
}
