//! Velocity integration: acceleration, friction and gravity.
//!
//! Every function here is a pure update of a velocity vector. A zero wish
//! direction contributes nothing and `dt == 0` is a no-op, so callers never
//! need to guard.

use glam::Vec3;

#[inline]
fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Accelerate toward `wish_dir * max_speed` on the ground.
///
/// The horizontal velocity change needed this frame is turned into an
/// acceleration, clamped to `acceleration`, and applied for `dt`. The
/// vertical component is never touched and the target is never overshot.
pub fn ground_accelerate(
    velocity: &mut Vec3,
    wish_dir: Vec3,
    max_speed: f32,
    acceleration: f32,
    dt: f32,
) {
    if dt <= 0.0 {
        return;
    }

    let target = horizontal(wish_dir).normalize_or_zero() * max_speed;
    let change = target - horizontal(*velocity);
    let accel = (change / dt).clamp_length_max(acceleration.max(0.0));

    *velocity += Vec3::new(accel.x, 0.0, accel.z) * dt;
}

/// Quake/Source style air strafing.
///
/// The wish speed is the current horizontal speed capped at `cap_speed`, so
/// strafing redirects momentum without creating it from standstill. When a
/// ground normal is given the added velocity is projected onto that plane.
pub fn source_air_accelerate(
    velocity: &mut Vec3,
    wish_dir: Vec3,
    cap_speed: f32,
    accel_rate: f32,
    dt: f32,
    ground_normal: Option<Vec3>,
) {
    let wish_dir = horizontal(wish_dir).normalize_or_zero();
    if dt <= 0.0 || wish_dir == Vec3::ZERO {
        return;
    }

    let magnitude = horizontal(*velocity).length();
    let wish_speed = magnitude.min(cap_speed);
    let current_speed = velocity.dot(wish_dir);
    let add_speed = wish_speed - current_speed;
    if add_speed <= 0.0 {
        return;
    }

    let accel_speed = (accel_rate * magnitude * dt).min(add_speed);
    let mut add = wish_dir * accel_speed;
    if let Some(normal) = ground_normal {
        add = add.reject_from_normalized(normal.normalize_or(Vec3::Y));
    }

    *velocity += add;
}

/// Direct air steering: add `wish * acceleration`, clamped to `max_speed`.
pub fn normal_air_accelerate(velocity: &mut Vec3, wish_dir: Vec3, max_speed: f32, acceleration: f32) {
    let wish_dir = horizontal(wish_dir).normalize_or_zero();
    *velocity += (wish_dir * acceleration).clamp_length_max(max_speed.max(0.0));
}

/// Ground friction. Returns the multiplier applied, always in `[0, 1]`.
///
/// Below `stop_speed` the drop is computed as if moving at `stop_speed`,
/// which brings slow drift to a full stop quickly.
pub fn apply_friction(velocity: &mut Vec3, friction: f32, stop_speed: f32, dt: f32) -> f32 {
    let speed = velocity.length();
    if speed <= 0.0 || dt <= 0.0 {
        return 1.0;
    }

    let control = speed.max(stop_speed);
    let drop = control * friction.max(0.0) * dt;
    let multiplier = ((speed - drop).max(0.0) / speed).clamp(0.0, 1.0);

    *velocity *= multiplier;
    multiplier
}

/// Gravity. While grounded and not rising, vertical speed is pinned to
/// `-stick_speed` so the capsule keeps contact with the floor.
pub fn apply_gravity(velocity: &mut Vec3, gravity: Vec3, grounded: bool, stick_speed: f32, dt: f32) {
    if grounded && velocity.y <= 0.0 {
        velocity.y = -stick_speed.abs();
        return;
    }
    *velocity += gravity * dt;
}

/// Gravity while resting against a slope too steep to stand on: only the
/// component along the slope is applied, so the capsule slides down it.
pub fn apply_slope_gravity(velocity: &mut Vec3, gravity: Vec3, ground_normal: Vec3, dt: f32) {
    let normal = ground_normal.normalize_or(Vec3::Y);
    *velocity += (gravity * dt).reject_from_normalized(normal);
}

/// Vertical launch speed that reaches `jump_height` under `gravity_y`.
pub fn jump_launch_speed(jump_height: f32, gravity_y: f32) -> f32 {
    (2.0 * jump_height.max(0.0) * gravity_y.abs()).sqrt()
}

/// Remove the part of `velocity` that points into a surface.
pub fn clip_into_surface(velocity: &mut Vec3, normal: Vec3) {
    let into = velocity.dot(normal);
    if into < 0.0 {
        *velocity -= normal * into;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_accelerate_converges_without_overshoot() {
        let mut velocity = Vec3::ZERO;
        let mut last = 0.0;

        for _ in 0..200 {
            ground_accelerate(&mut velocity, Vec3::X, 4.0, 10.0, 0.02);
            let speed = velocity.x;
            assert!(speed >= last, "speed must not decrease");
            assert!(speed <= 4.0 + 1e-4, "speed {speed} overshot");
            last = speed;
        }

        assert!((velocity.x - 4.0).abs() < 1e-3);
        // 10 m/s² for 0.02s per step: full speed after 20 steps
    }

    #[test]
    fn test_ground_accelerate_first_step() {
        let mut velocity = Vec3::ZERO;
        ground_accelerate(&mut velocity, Vec3::X, 4.0, 10.0, 0.02);
        assert!((velocity.x - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_ground_accelerate_keeps_vertical() {
        let mut velocity = Vec3::new(1.0, -2.0, 0.5);
        ground_accelerate(&mut velocity, Vec3::new(0.0, 0.0, 1.0), 4.0, 10.0, 0.02);
        assert_eq!(velocity.y, -2.0);
    }

    #[test]
    fn test_ground_accelerate_zero_dt_is_noop() {
        let mut velocity = Vec3::new(1.0, 0.0, 0.0);
        ground_accelerate(&mut velocity, Vec3::Z, 4.0, 10.0, 0.0);
        assert_eq!(velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ground_accelerate_without_wish_decelerates() {
        let mut velocity = Vec3::new(3.0, 0.0, 0.0);
        ground_accelerate(&mut velocity, Vec3::ZERO, 4.0, 10.0, 0.1);
        assert!((velocity.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_source_air_needs_horizontal_speed() {
        let mut velocity = Vec3::new(0.0, -2.0, 0.0);
        source_air_accelerate(&mut velocity, Vec3::X, 1.0, 10.0, 0.02, None);
        assert_eq!(velocity, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn test_source_air_turns_momentum() {
        // Moving +X at 5, strafing toward +Z
        let mut velocity = Vec3::new(5.0, 0.0, 0.0);
        source_air_accelerate(&mut velocity, Vec3::Z, 1.0, 10.0, 0.01, None);

        // wish = min(5, 1) = 1, current = 0, add = 1, accel = min(10*5*0.01, 1) = 0.5
        assert!((velocity.z - 0.5).abs() < 1e-5);
        assert_eq!(velocity.x, 5.0);
    }

    #[test]
    fn test_source_air_no_gain_past_cap() {
        let mut velocity = Vec3::new(5.0, 0.0, 0.0);
        source_air_accelerate(&mut velocity, Vec3::X, 1.0, 10.0, 0.02, None);
        assert_eq!(velocity, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_source_air_projects_on_ground_plane() {
        let normal = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let mut velocity = Vec3::new(0.0, 0.0, 5.0);
        source_air_accelerate(&mut velocity, Vec3::X, 1.0, 10.0, 0.01, Some(normal));

        let added = velocity - Vec3::new(0.0, 0.0, 5.0);
        assert!(added.dot(normal).abs() < 1e-5);
        assert!(added.y > 0.0, "pushing into the ramp lifts along it");
    }

    #[test]
    fn test_normal_air_clamps() {
        let mut velocity = Vec3::ZERO;
        normal_air_accelerate(&mut velocity, Vec3::X, 1.0, 10.0);
        assert!((velocity.x - 1.0).abs() < 1e-5);

        let mut velocity = Vec3::ZERO;
        normal_air_accelerate(&mut velocity, Vec3::X, 1.0, 0.3);
        assert!((velocity.x - 0.3).abs() < 1e-5);

        let mut velocity = Vec3::ONE;
        normal_air_accelerate(&mut velocity, Vec3::ZERO, 1.0, 10.0);
        assert_eq!(velocity, Vec3::ONE);
    }

    #[test]
    fn test_friction_multiplier_in_unit_range() {
        for (speed, friction, dt) in [(0.05, 10.0, 0.02), (4.0, 10.0, 0.02), (4.0, 10.0, 1.0), (100.0, 0.0, 0.02)] {
            let mut velocity = Vec3::new(speed, 0.0, 0.0);
            let m = apply_friction(&mut velocity, friction, 0.1, dt);
            assert!((0.0..=1.0).contains(&m), "multiplier {m}");
            assert!(velocity.length() <= speed + 1e-6);
        }
    }

    #[test]
    fn test_friction_stop_speed_kills_drift() {
        let mut velocity = Vec3::new(0.05, 0.0, 0.0);
        // control = 0.1, drop = 0.1*10*0.1 = 0.1 > 0.05
        apply_friction(&mut velocity, 10.0, 0.1, 0.1);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_friction_at_rest() {
        let mut velocity = Vec3::ZERO;
        assert_eq!(apply_friction(&mut velocity, 10.0, 0.1, 0.02), 1.0);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_gravity_grounded_sticks() {
        let gravity = Vec3::new(0.0, -9.81, 0.0);

        let mut velocity = Vec3::new(1.0, -20.0, 0.0);
        apply_gravity(&mut velocity, gravity, true, 2.0, 0.02);
        assert_eq!(velocity.y, -2.0);

        // Rising off the ground keeps the launch
        let mut velocity = Vec3::new(0.0, 8.0, 0.0);
        apply_gravity(&mut velocity, gravity, true, 2.0, 0.02);
        assert!((velocity.y - (8.0 - 9.81 * 0.02)).abs() < 1e-5);

        let mut velocity = Vec3::ZERO;
        apply_gravity(&mut velocity, gravity, false, 2.0, 0.5);
        assert!((velocity.y + 4.905).abs() < 1e-5);
    }

    #[test]
    fn test_slope_gravity_stays_on_plane() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let mut velocity = Vec3::ZERO;
        apply_slope_gravity(&mut velocity, Vec3::new(0.0, -9.81, 0.0), normal, 0.1);
        assert!(velocity.dot(normal).abs() < 1e-5);
        assert!(velocity.x > 0.0 && velocity.y < 0.0, "slides down and away");
    }

    #[test]
    fn test_jump_launch_speed() {
        let v = jump_launch_speed(4.0, -9.81);
        assert!((v - 8.8589).abs() < 1e-3, "launch {v}");
        assert_eq!(jump_launch_speed(4.0, 0.0), 0.0);
    }

    #[test]
    fn test_clip_into_surface() {
        let mut velocity = Vec3::new(3.0, -1.0, 0.0);
        clip_into_surface(&mut velocity, -Vec3::X);
        assert_eq!(velocity, Vec3::new(0.0, -1.0, 0.0));

        // Moving away is left alone
        let mut velocity = Vec3::new(-3.0, 0.0, 0.0);
        clip_into_surface(&mut velocity, -Vec3::X);
        assert_eq!(velocity, Vec3::new(-3.0, 0.0, 0.0));
    }
}
