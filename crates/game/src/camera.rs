//! First-person camera driven by the locomotion controller.

use glam::{Mat4, Vec3};
use stride_physics::movement::{CameraPose, CameraSink};

/// First-person camera state.
///
/// The controller writes pitch, yaw and the local offset through
/// [`CameraSink`]; the owner then places it with [`FirstPersonCamera::follow`].
#[derive(Debug, Clone)]
pub struct FirstPersonCamera {
    /// Eye position in world space.
    pub position: Vec3,

    /// Pitch in degrees, positive looks down.
    pub pitch: f32,

    /// Yaw in degrees.
    pub yaw: f32,

    /// Offset from the body position, set by the controller.
    pub local_offset: Vec3,

    /// Field of view in degrees.
    pub fov: f32,

    /// Near clipping plane.
    pub near: f32,

    /// Far clipping plane.
    pub far: f32,

    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            local_offset: Vec3::ZERO,
            fov: 90.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl FirstPersonCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Place the eye relative to the body it is attached to.
    pub fn follow(&mut self, body_position: Vec3) {
        self.position = body_position + self.local_offset;
    }

    /// Get the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Get the projection matrix for rendering.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();

        Vec3::new(cos_pitch * cos_yaw, -sin_pitch, cos_pitch * sin_yaw)
    }

    /// Get the right direction vector (horizontal only).
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }
}

impl CameraSink for FirstPersonCamera {
    fn apply_pose(&mut self, pose: &CameraPose) {
        self.pitch = pose.pitch;
        self.yaw = pose.yaw;
        self.local_offset = pose.local_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_matrix() {
        let camera = FirstPersonCamera::default();
        assert!(camera.view_matrix().determinant().abs() > 0.0001);
    }

    #[test]
    fn test_forward_direction() {
        let mut camera = FirstPersonCamera::default();

        // Yaw 0 points along +X
        let forward = camera.forward();
        assert!((forward.x - 1.0).abs() < 0.01);

        camera.yaw = 90.0;
        let forward = camera.forward();
        assert!((forward.z - 1.0).abs() < 0.01);

        // Positive pitch looks down
        camera.pitch = 90.0;
        assert!((camera.forward().y + 1.0).abs() < 0.01);
    }

    #[test]
    fn test_pose_then_follow() {
        let mut camera = FirstPersonCamera::default();
        camera.apply_pose(&CameraPose {
            pitch: 10.0,
            yaw: 45.0,
            local_offset: Vec3::new(0.0, 0.75, 0.0),
        });
        camera.follow(Vec3::new(1.0, 1.0, 2.0));

        assert_eq!(camera.pitch, 10.0);
        assert!((camera.position - Vec3::new(1.0, 1.75, 2.0)).length() < 0.0001);
    }
}
