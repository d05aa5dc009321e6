//! Locomotion state and per-frame input.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::CapsuleShape;
use crate::machine::{ParameterBoard, StateId};

/// Which sides of the capsule touched something during the last move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFlags(pub u8);

impl CollisionFlags {
    /// Touched a wall or a slope too steep to stand on.
    pub const SIDES: u8 = 1 << 0;

    /// Touched a ceiling.
    pub const ABOVE: u8 = 1 << 1;

    /// Touched the floor.
    pub const BELOW: u8 = 1 << 2;

    /// Classify a contact normal. Anything within ~45 degrees of vertical
    /// counts as floor or ceiling.
    pub fn from_normal(normal: Vec3) -> u8 {
        if normal.y > 0.7 {
            Self::BELOW
        } else if normal.y < -0.7 {
            Self::ABOVE
        } else {
            Self::SIDES
        }
    }

    /// Check if a flag is set.
    #[inline]
    pub fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Current capsule dimensions relative to the entity position.
///
/// The entity position is the center of the standing capsule. Crouching
/// shrinks `height` and moves `center_offset` so one end stays put.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderShape {
    pub height: f32,
    pub center_offset: f32,
}

impl ColliderShape {
    pub fn standing(height: f32) -> Self {
        Self {
            height,
            center_offset: 0.0,
        }
    }

    /// World-space capsule for an entity at `position`.
    pub fn capsule_at(&self, position: Vec3, radius: f32) -> CapsuleShape {
        CapsuleShape::from_height(self.center(position), self.height, radius)
    }

    #[inline]
    pub fn center(&self, position: Vec3) -> Vec3 {
        position + Vec3::Y * self.center_offset
    }
}

/// Orientation and offset handed to the camera once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Local pitch in degrees, positive looks down.
    pub pitch: f32,
    /// Body yaw in degrees.
    pub yaw: f32,
    /// Camera offset from the entity position.
    pub local_offset: Vec3,
}

/// Receives the camera pose in the late-update phase.
pub trait CameraSink {
    fn apply_pose(&mut self, pose: &CameraPose);
}

/// Input snapshot for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocomotionInput {
    /// Strafe (x) and forward (y) axes in [-1, 1].
    pub move_axis: Vec2,
    /// Look delta this frame (x = yaw, y = pitch), in device units.
    pub look_delta: Vec2,
    pub jump: bool,
    pub crouch: bool,
    pub run: bool,
}

impl LocomotionInput {
    /// Check if any movement input is active.
    #[inline]
    pub fn has_movement_input(&self) -> bool {
        self.move_axis.length_squared() > 0.0
    }
}

/// Complete per-entity locomotion state.
///
/// One of these is owned by each controller. Behaviors and the crouch
/// sequencer mutate it through the frame pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocomotionState {
    /// Standing capsule center in world space.
    pub position: Vec3,

    /// Velocity in world space (meters/second).
    pub velocity: Vec3,

    pub grounded: bool,

    /// Ground normal from the last probe, `Vec3::Y` when airborne.
    pub ground_normal: Vec3,

    /// Angle between the ground normal and up, in degrees.
    pub slope_angle: f32,

    /// Touching ground steeper than the slope limit.
    pub slope_exceeded: bool,

    /// Vertical correction applied with this frame's displacement.
    pub snap_offset: f32,

    /// Armed while grounded; the first ceiling contact disarms it.
    pub can_hit_ceiling: bool,

    /// Body yaw in degrees.
    pub yaw: f32,

    /// Camera pitch in degrees, clamped to the look range.
    pub pitch: f32,

    /// Camera height above the entity position.
    pub camera_height: f32,

    pub collider: ColliderShape,

    /// Sides touched during the last move.
    pub collision_flags: CollisionFlags,

    pub active_state: StateId,

    pub board: ParameterBoard,
}

impl LocomotionState {
    pub fn new(position: Vec3, collider: ColliderShape, camera_height: f32, board: ParameterBoard) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            ground_normal: Vec3::Y,
            slope_angle: 0.0,
            slope_exceeded: false,
            snap_offset: 0.0,
            can_hit_ceiling: true,
            yaw: 0.0,
            pitch: 0.0,
            camera_height,
            collider,
            collision_flags: CollisionFlags::default(),
            active_state: StateId(0),
            board,
        }
    }

    /// Get the forward direction from the body yaw (horizontal only).
    pub fn forward_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos_yaw, 0.0, sin_yaw)
    }

    /// Get the right direction from the body yaw (horizontal only).
    pub fn right_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }

    /// World-space wish direction for a move axis. Zero input gives zero.
    pub fn wish_direction(&self, move_axis: Vec2) -> Vec3 {
        let local = move_axis.normalize_or_zero();
        (self.right_direction() * local.x + self.forward_direction() * local.y).normalize_or_zero()
    }

    /// Get current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }

    /// Camera position in world space.
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.camera_height
    }
}
