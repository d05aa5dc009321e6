//! Locomotion configuration.
//!
//! All tunables for one character live in [`LocomotionConfig`]. The config
//! is immutable once a controller has been built from it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::LayerMask;
use crate::error::ConfigError;

/// Speed and acceleration for one ground gait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitSettings {
    /// A disabled gait never accelerates and never raises its input parameter.
    pub enabled: bool,
    /// Target horizontal speed (meters/second).
    pub max_speed: f32,
    /// Maximum change in horizontal speed (meters/second²).
    pub acceleration: f32,
}

impl GaitSettings {
    pub const fn new(enabled: bool, max_speed: f32, acceleration: f32) -> Self {
        Self {
            enabled,
            max_speed,
            acceleration,
        }
    }
}

/// How wish direction turns into velocity while airborne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AirStrafe {
    /// No air control at all.
    None,
    /// Add `wish * air_acceleration`, clamped to `max_air_acceleration`.
    Normal,
    /// Quake/Source air strafing capped by current horizontal speed.
    #[default]
    SourceStyle,
}

/// Configuration for capsule locomotion.
///
/// Distances are meters, angles degrees, times seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    // ========================================================================
    // Collider
    // ========================================================================
    /// Capsule radius.
    pub radius: f32,

    /// Sphere radius used by the step-snap probe.
    pub feet_radius: f32,

    /// Capsule height while standing.
    pub standing_collider_height: f32,

    /// Capsule height while crouched.
    pub crouched_collider_height: f32,

    /// Gap kept between the capsule and anything it slides along.
    pub skin_width: f32,

    // ========================================================================
    // Ground
    // ========================================================================
    /// Steepest walkable slope.
    pub slope_limit: f32,

    /// Tallest ledge the capsule steps onto, and how far below it snaps down.
    pub step_offset: f32,

    /// Extra reach of the ground and ceiling probes.
    pub ground_check_distance: f32,

    /// Layers the capsule collides with.
    pub collision_mask: LayerMask,

    /// Layers that count as ground.
    pub ground_mask: LayerMask,

    // ========================================================================
    // Gaits
    // ========================================================================
    pub walking: GaitSettings,
    pub running: GaitSettings,
    pub crouching: GaitSettings,

    /// Ground friction coefficient.
    pub friction: f32,

    /// Speed below which friction bites as if moving at this speed.
    pub stop_speed: f32,

    // ========================================================================
    // Jump and Air
    // ========================================================================
    pub can_jump: bool,

    /// Apex height of a jump (meters).
    pub jump_force: f32,

    pub gravity: Vec3,

    /// Downward speed held while grounded so the capsule hugs the floor.
    pub ground_stick_speed: f32,

    pub air_strafe: AirStrafe,

    /// Speed cap for air strafing.
    pub max_air_acceleration: f32,

    /// Air acceleration rate.
    pub air_acceleration: f32,

    // ========================================================================
    // Crouch
    // ========================================================================
    /// Seconds to go from standing to crouched.
    pub time_to_crouch: f32,

    /// Seconds to go from crouched to standing.
    pub time_to_uncrouch: f32,

    /// Camera height above the collider center while standing.
    pub standing_camera_height: f32,

    /// Camera height above the collider center while crouched.
    pub crouched_camera_height: f32,

    // ========================================================================
    // Look
    // ========================================================================
    pub sensitivity: f32,
    pub sensitivity_x: f32,
    pub sensitivity_y: f32,
    pub min_look_angle: f32,
    pub max_look_angle: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            // Collider
            radius: 0.5,
            feet_radius: 0.35,
            standing_collider_height: 2.0,
            crouched_collider_height: 1.5,
            skin_width: 0.01,

            // Ground
            slope_limit: 45.0,
            step_offset: 0.3,
            ground_check_distance: 0.1,
            collision_mask: LayerMask::CHARACTER_SOLID,
            ground_mask: LayerMask::WALKABLE,

            // Gaits
            walking: GaitSettings::new(true, 4.0, 10.0),
            running: GaitSettings::new(true, 6.0, 10.0),
            crouching: GaitSettings::new(true, 1.5, 10.0),
            friction: 10.0,
            stop_speed: 0.1,

            // Jump and air
            can_jump: true,
            jump_force: 4.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            ground_stick_speed: 2.0,
            air_strafe: AirStrafe::SourceStyle,
            max_air_acceleration: 1.0,
            air_acceleration: 10.0,

            // Crouch
            time_to_crouch: 0.25,
            time_to_uncrouch: 0.25,
            standing_camera_height: 0.75,
            crouched_camera_height: 0.25,

            // Look
            sensitivity: 10.0,
            sensitivity_x: 1.0,
            sensitivity_y: 1.0,
            min_look_angle: -90.0,
            max_look_angle: 90.0,
        }
    }
}

impl LocomotionConfig {
    /// Quick, floaty movement with strong air strafing.
    pub fn arena() -> Self {
        Self {
            walking: GaitSettings::new(true, 6.0, 14.0),
            running: GaitSettings::new(true, 9.0, 14.0),
            crouching: GaitSettings::new(true, 3.0, 14.0),
            friction: 6.0,
            jump_force: 1.5,
            max_air_acceleration: 1.5,
            air_acceleration: 70.0,
            time_to_crouch: 0.15,
            time_to_uncrouch: 0.15,
            ..Default::default()
        }
    }

    /// Slow, grounded movement with direct air steering.
    pub fn tactical() -> Self {
        Self {
            walking: GaitSettings::new(true, 3.0, 8.0),
            running: GaitSettings::new(true, 5.0, 8.0),
            crouching: GaitSettings::new(true, 1.2, 8.0),
            friction: 12.0,
            jump_force: 0.8,
            air_strafe: AirStrafe::Normal,
            max_air_acceleration: 0.5,
            air_acceleration: 0.2,
            time_to_crouch: 0.35,
            time_to_uncrouch: 0.4,
            ..Default::default()
        }
    }

    /// Vertical gravity component, the only one jump and ground-stick use.
    #[inline]
    pub fn gravity_y(&self) -> f32 {
        self.gravity.y
    }

    /// Collider center offset that keeps the feet in place while crouched.
    #[inline]
    pub fn crouched_center_offset(&self) -> f32 {
        (self.crouched_collider_height - self.standing_collider_height) * 0.5
    }

    /// Collider center offset that keeps the head in place while crouched in the air.
    #[inline]
    pub fn air_crouched_center_offset(&self) -> f32 {
        -self.crouched_center_offset()
    }

    /// Check the settings for values no controller can run with.
    ///
    /// Returns one error per offending field.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut fail = |field: &'static str, reason: String| {
            errors.push(ConfigError::InvalidSetting { field, reason });
        };

        if !(self.radius > 0.0) {
            fail("radius", format!("must be positive, got {}", self.radius));
        }
        if !(self.feet_radius > 0.0) || self.feet_radius > self.radius {
            fail(
                "feet_radius",
                format!("must be in (0, radius], got {}", self.feet_radius),
            );
        }
        if self.crouched_collider_height < 2.0 * self.radius {
            fail(
                "crouched_collider_height",
                format!(
                    "{} is shorter than the capsule diameter {}",
                    self.crouched_collider_height,
                    2.0 * self.radius
                ),
            );
        }
        if self.crouched_collider_height > self.standing_collider_height {
            fail(
                "crouched_collider_height",
                format!(
                    "{} exceeds standing height {}",
                    self.crouched_collider_height, self.standing_collider_height
                ),
            );
        }
        if self.step_offset < 0.0 || self.step_offset > self.standing_collider_height {
            fail(
                "step_offset",
                format!(
                    "must be in [0, standing height], got {}",
                    self.step_offset
                ),
            );
        }
        if self.min_look_angle > self.max_look_angle {
            fail(
                "min_look_angle",
                format!(
                    "{} is above max_look_angle {}",
                    self.min_look_angle, self.max_look_angle
                ),
            );
        }
        if self.time_to_crouch < 0.0 || self.time_to_uncrouch < 0.0 {
            fail(
                "time_to_crouch",
                "crouch durations must not be negative".to_string(),
            );
        }
        if !(0.0..90.0).contains(&self.slope_limit) {
            fail(
                "slope_limit",
                format!("must be in [0, 90), got {}", self.slope_limit),
            );
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LocomotionConfig::default();
        assert!(config.walking.max_speed > 0.0);
        assert!(config.gravity_y() < 0.0);
        assert!(config.validate().is_empty());
        assert_eq!(config.air_strafe, AirStrafe::SourceStyle);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(LocomotionConfig::arena().validate().is_empty());
        assert!(LocomotionConfig::tactical().validate().is_empty());
        assert_eq!(LocomotionConfig::tactical().air_strafe, AirStrafe::Normal);
    }

    #[test]
    fn test_crouch_offsets_keep_feet_and_head() {
        let config = LocomotionConfig::default();
        // Standing bottom is at -1.0; crouched bottom must stay there.
        let center = config.crouched_center_offset();
        assert!((center - config.crouched_collider_height * 0.5 - -1.0).abs() < 0.0001);
        // In the air the top stays at +1.0 instead.
        let center = config.air_crouched_center_offset();
        assert!((center + config.crouched_collider_height * 0.5 - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_validate_reports_each_field() {
        let config = LocomotionConfig {
            crouched_collider_height: 3.0,
            min_look_angle: 10.0,
            max_look_angle: -10.0,
            ..Default::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidSetting { field: "min_look_angle", .. }
        )));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LocomotionConfig =
            serde_json::from_str(r#"{ "jump_force": 2.0, "air_strafe": "Normal" }"#)
                .expect("partial config should parse");
        assert_eq!(config.jump_force, 2.0);
        assert_eq!(config.air_strafe, AirStrafe::Normal);
        assert_eq!(config.radius, 0.5);
    }
}
