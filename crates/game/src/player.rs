//! Player entity.
//!
//! A player owns a locomotion controller, the camera it drives and its
//! subscription on the input bus. Spawning subscribes, [`Player::teardown`]
//! unsubscribes.

use glam::Vec3;
use stride_physics::collision::CollisionOracle;
use stride_physics::machine::BehaviorRegistry;
use stride_physics::movement::{LocomotionController, LocomotionInput};

use crate::camera::FirstPersonCamera;
use crate::capture::{CaptureHandle, InputCapture};
use crate::input::{InputBindings, InputBus, InputError, InputState, Subscription};
use crate::level::SpawnPoint;
use crate::profile::ControllerProfile;

/// Unique identifier for entities.
pub type EntityId = u32;

/// Clearance between the feet and the floor at spawn.
const SPAWN_CLEARANCE: f32 = 0.01;

/// A player in the game.
#[derive(Debug)]
pub struct Player {
    /// Unique player ID.
    pub id: EntityId,

    /// Player name/handle.
    pub name: String,

    pub controller: LocomotionController,

    pub camera: FirstPersonCamera,

    bindings: InputBindings,
    subscription: Option<Subscription>,
    input: InputState,
    capture: Option<CaptureHandle>,
    input_errors: Vec<InputError>,
}

impl Player {
    /// Create a player standing on `spawn` and subscribe it to the bus.
    ///
    /// The player takes the input capture if nobody holds it yet. Bindings
    /// the bus cannot resolve are logged once each and the player runs
    /// without input instead of failing to spawn.
    pub fn spawn(
        id: EntityId,
        name: &str,
        profile: &ControllerProfile,
        registry: &BehaviorRegistry,
        bus: &mut InputBus,
        capture: &InputCapture,
        spawn: &SpawnPoint,
    ) -> Self {
        let input_errors = bus.unresolved(&profile.bindings);
        let subscription = if input_errors.is_empty() {
            bus.subscribe(&profile.bindings).ok()
        } else {
            for error in &input_errors {
                log::error!("player {id} input binding: {error}");
            }
            log::warn!("player {id} runs without input after {} error(s)", input_errors.len());
            None
        };

        let mut controller = profile.build_controller(registry);
        let half_height = controller.config().standing_collider_height * 0.5;
        controller.set_position(spawn.position + Vec3::Y * (half_height + SPAWN_CLEARANCE));
        controller.set_yaw(spawn.facing);

        let capture = match capture.acquire() {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::debug!("player {id} spawned without capture: {err}");
                None
            }
        };

        let mut camera = FirstPersonCamera::default();
        camera.yaw = controller.state().yaw;
        camera.local_offset = Vec3::Y * controller.state().camera_height;
        camera.follow(controller.position());

        Self {
            id,
            name: name.to_string(),
            controller,
            camera,
            bindings: profile.bindings.clone(),
            subscription,
            input: InputState::default(),
            capture,
            input_errors,
        }
    }

    /// Gather this frame's input from the bus.
    pub fn poll_input(&mut self, bus: &mut InputBus) -> LocomotionInput {
        if let Some(subscription) = &self.subscription {
            for event in bus.drain(subscription) {
                self.input.apply(&self.bindings, &event);
            }
        }
        self.input.snapshot()
    }

    /// Run one frame: update, fixed update, then late update and camera.
    pub fn frame(&mut self, bus: &mut InputBus, oracle: &dyn CollisionOracle, dt: f32) {
        let input = self.poll_input(bus);

        self.controller.update(&input, oracle, dt);
        self.controller.fixed_update(&input, oracle, dt);
        self.controller.late_update(&input, oracle, dt, &mut self.camera);
        self.camera.follow(self.controller.position());
    }

    /// Unsubscribe and give up the capture.
    pub fn teardown(&mut self, bus: &mut InputBus) {
        if let Some(subscription) = self.subscription.take() {
            bus.unsubscribe(subscription);
        }
        if let Some(handle) = self.capture.take() {
            handle.release();
        }
        self.input.clear();
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.controller.position()
    }

    /// Get the player's eye position (for camera).
    #[inline]
    pub fn eye_position(&self) -> Vec3 {
        self.camera.position
    }

    #[inline]
    pub fn on_ground(&self) -> bool {
        self.controller.state().grounded
    }

    pub fn has_capture(&self) -> bool {
        self.capture.is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Bindings that could not be resolved at spawn.
    pub fn input_errors(&self) -> &[InputError] {
        &self.input_errors
    }

    /// True if the controller or the input bindings failed to configure.
    pub fn is_degraded(&self) -> bool {
        self.controller.is_degraded() || !self.input_errors.is_empty()
    }
}
