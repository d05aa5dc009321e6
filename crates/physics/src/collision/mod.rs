//! Collision queries for character movement.
//!
//! Movement code is written against the [`CollisionOracle`] trait. The
//! [`CollisionWorld`] implementation answers those queries with parry3d
//! against box brushes, which is what the game crate and the tests use.
//!
//! # Key Types
//!
//! - [`CollisionOracle`]: Capsule/sphere sweeps, raycasts and overlap counts
//! - [`SweepHit`]: Contact point, normal, travel distance and layers of a hit
//! - [`LayerMask`]: 32-bit layer filter carried by every query
//!
//! # Sweep Algorithm
//!
//! Sweeps step the shape along its path in increments of half its radius,
//! then binary-search the first blocked interval. The hit normal and point
//! come from the penetrating contact at the end of the search.

mod flags;
mod trace;
mod world;

pub use flags::LayerMask;
pub use trace::{CapsuleShape, ColliderId, CollisionOracle, SweepHit};
pub use world::{CollisionBrush, CollisionWorld};
