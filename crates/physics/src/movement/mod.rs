//! Character locomotion.
//!
//! This module implements first-person capsule movement with:
//!
//! - Ground, ceiling and headroom probes ([`sensor`])
//! - Ground acceleration, three air-strafe models, friction and gravity
//!   ([`integrator`])
//! - Collide-and-slide with stair stepping ([`motor`])
//! - Timed, reversible crouch transitions ([`CrouchSequencer`])
//! - The built-in state behaviors ([`states`])
//!
//! # Design
//!
//! Movement is driven by the [`LocomotionController`], which takes a
//! [`LocomotionInput`] snapshot each frame and updates its
//! [`LocomotionState`] through a [`CollisionOracle`](crate::collision::CollisionOracle).
//!
//! The same inputs against the same world always produce the same outputs.

mod config;
mod controller;
mod crouch;
pub mod integrator;
pub mod motor;
pub mod sensor;
mod state;
pub mod states;

pub use config::{AirStrafe, GaitSettings, LocomotionConfig};
pub use controller::LocomotionController;
pub use crouch::{CrouchDirection, CrouchEvent, CrouchFrame, CrouchSequencer, CrouchTask};
pub use motor::{MotorSettings, MoveResult};
pub use sensor::GroundReport;
pub use state::{
    CameraPose, CameraSink, ColliderShape, CollisionFlags, LocomotionInput, LocomotionState,
};
