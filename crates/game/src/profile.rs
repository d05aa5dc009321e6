//! Controller profiles loaded from JSON.
//!
//! A profile bundles everything needed to build one player's controller:
//! the locomotion settings, the state graph and the input bindings. Every
//! section is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stride_physics::machine::{BehaviorRegistry, StateGraphConfig};
use stride_physics::movement::{LocomotionConfig, LocomotionController};
use thiserror::Error;

use crate::input::InputBindings;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown preset `{0}` (expected default, arena or tactical)")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerProfile {
    pub locomotion: LocomotionConfig,
    pub graph: StateGraphConfig,
    pub bindings: InputBindings,
}

impl ControllerProfile {
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Profile with one of the built-in locomotion presets.
    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        let locomotion = match name {
            "default" => LocomotionConfig::default(),
            "arena" => LocomotionConfig::arena(),
            "tactical" => LocomotionConfig::tactical(),
            other => return Err(ProfileError::UnknownPreset(other.to_string())),
        };
        Ok(Self {
            locomotion,
            ..Default::default()
        })
    }

    /// Build a controller. Configuration errors leave it degraded, not absent.
    pub fn build_controller(&self, registry: &BehaviorRegistry) -> LocomotionController {
        LocomotionController::new(self.locomotion.clone(), &self.graph, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_physics::movement::AirStrafe;

    #[test]
    fn test_empty_profile_uses_defaults() {
        let profile = ControllerProfile::from_json("{}").unwrap();
        assert_eq!(profile, ControllerProfile::default());
        assert_eq!(profile.graph.states.len(), 10);
    }

    #[test]
    fn test_partial_profile() {
        let profile = ControllerProfile::from_json(
            r#"{
                "locomotion": { "air_strafe": "Normal", "jump_force": 2.5 },
                "bindings": { "run": "Sprint" }
            }"#,
        )
        .unwrap();

        assert_eq!(profile.locomotion.air_strafe, AirStrafe::Normal);
        assert_eq!(profile.locomotion.jump_force, 2.5);
        assert_eq!(profile.bindings.run, "Sprint");
        assert_eq!(profile.bindings.jump, "Jump");
    }

    #[test]
    fn test_parse_error() {
        let err = ControllerProfile::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
    }

    #[test]
    fn test_presets() {
        let arena = ControllerProfile::preset("arena").unwrap();
        assert_eq!(arena.locomotion, LocomotionConfig::arena());
        assert!(matches!(
            ControllerProfile::preset("moon"),
            Err(ProfileError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_json_round_trip_builds_healthy_controller() {
        let json = ControllerProfile::preset("tactical").unwrap().to_json().unwrap();
        let profile = ControllerProfile::from_json(&json).unwrap();

        let controller = profile.build_controller(&BehaviorRegistry::standard());
        assert!(!controller.is_degraded());
        assert_eq!(controller.config().air_strafe, AirStrafe::Normal);
    }

    #[test]
    fn test_bad_graph_builds_degraded_controller() {
        let profile = ControllerProfile::from_json(
            r#"{ "graph": { "states": [ { "name": "Idle", "transitions": [ { "to": 4 } ] } ] } }"#,
        )
        .unwrap();

        let controller = profile.build_controller(&BehaviorRegistry::standard());
        assert!(controller.is_degraded());
        assert_eq!(controller.active_state_name(), "Idle");
    }
}
