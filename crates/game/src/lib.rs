//! Stride game layer.
//!
//! This crate hosts first-person locomotion controllers in a small frame
//! simulation:
//!
//! - Input routing over named actions, with per-player subscriptions
//! - The input capture capability (cursor lock, one holder at a time)
//! - A first-person camera fed by the controller's late update
//! - Levels with kinematic platforms
//! - Controller profiles loaded from JSON
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Simulation                             │
//! │  ┌──────────┐   ┌───────────────┐   ┌──────────────────────┐  │
//! │  │ InputBus │──►│ Player        │──►│ FirstPersonCamera    │  │
//! │  │ (actions)│   │ (controller,  │   │ (pitch, yaw, offset) │  │
//! │  └──────────┘   │  subscription)│   └──────────────────────┘  │
//! │                 └───────┬───────┘                             │
//! │                         ▼                                     │
//! │                 Level (CollisionWorld, platforms)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod camera;
pub mod capture;
pub mod input;
pub mod level;
pub mod player;
pub mod profile;
pub mod simulation;

pub use camera::FirstPersonCamera;
pub use capture::{CaptureHandle, InputCapture};
pub use input::{
    ActionKind, ActionValue, InputBindings, InputBus, InputError, InputEvent, InputState,
    Subscription,
};
pub use level::{Level, MovingPlatform, SpawnPoint};
pub use player::{EntityId, Player};
pub use profile::{ControllerProfile, ProfileError};
pub use simulation::{Simulation, SimulationConfig};

// Re-export physics types for convenience
pub use stride_physics::{
    BehaviorRegistry, CollisionWorld, LayerMask, LocomotionConfig, LocomotionController,
    LocomotionInput, StateGraphConfig,
};
