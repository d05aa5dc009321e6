//! Stride locomotion engine
//!
//! A first-person capsule character controller: per-frame input goes in, a
//! velocity, a camera pose and a discrete movement state come out.
//!
//! # Architecture
//!
//! The crate is split into three systems:
//!
//! - **Collision**: the [`CollisionOracle`] query seam and a parry3d-backed
//!   [`CollisionWorld`] that implements it
//! - **Machine**: named boolean parameters, the transition graph and the
//!   behavior registry
//! - **Movement**: sensors, integrator, capsule motor, crouch sequencer and
//!   the [`LocomotionController`] that runs the frame pipeline
//!
//! # Frame pipeline
//!
//! 1. Probe ground and ceiling
//! 2. Apply friction and gravity
//! 3. Refresh parameters and fire at most one transition
//! 4. Run the active state's update and poll the crouch sequencer
//! 5. Move the capsule by `velocity * dt + snap`
//! 6. Late phase: look and camera pose

pub mod collision;
pub mod error;
pub mod machine;
pub mod movement;

// Re-export commonly used types
pub use collision::{CollisionOracle, CollisionWorld, LayerMask, SweepHit};
pub use error::{ConfigError, ConfigErrors};
pub use machine::{BehaviorRegistry, StateBehavior, StateGraph, StateGraphConfig};
pub use movement::{
    CameraPose, CameraSink, LocomotionConfig, LocomotionController, LocomotionInput,
    LocomotionState,
};
