//! Timed, reversible crouch and uncrouch transitions.
//!
//! A transition is a [`CrouchTask`] polled once per frame. At most one task
//! exists per entity: starting a new one cancels the old. Releasing crouch
//! halfway down reverses into an uncrouch that starts at the mirrored
//! point, so a transition `f` of the way through resumes at `1 - f`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::LocomotionConfig;
use super::sensor;
use super::state::{ColliderShape, LocomotionState};
use crate::collision::CollisionOracle;
use crate::machine::BuiltinParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrouchDirection {
    /// Standing to crouched.
    Down,
    /// Crouched to standing.
    Up,
}

impl CrouchDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
        }
    }

    fn duration(self, config: &LocomotionConfig) -> f32 {
        match self {
            Self::Down => config.time_to_crouch,
            Self::Up => config.time_to_uncrouch,
        }
        .max(0.0)
    }
}

/// One in-flight transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrouchTask {
    pub direction: CrouchDirection,
    pub elapsed: f32,
    pub duration: f32,
    cancelled: bool,
}

impl CrouchTask {
    /// How far through the transition, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrouchEvent {
    /// No task was running.
    Idle,
    /// The task advanced.
    Progress(CrouchDirection),
    /// Input flipped and the task was replaced by its reverse, which then advanced.
    Reversed(CrouchDirection),
    /// The task reached its end and applied the final collider.
    Completed(CrouchDirection),
    /// The task gave up: left the ground while crouching, or blocked while standing up.
    Aborted(CrouchDirection),
}

/// Per-frame inputs to the sequencer.
#[derive(Debug, Clone, Copy)]
pub struct CrouchFrame {
    pub crouch_held: bool,
    pub delta_time: f32,
}

/// Owner of the single crouch task of an entity.
#[derive(Debug, Clone, Default)]
pub struct CrouchSequencer {
    task: Option<CrouchTask>,
}

impl CrouchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self) -> Option<&CrouchTask> {
        self.task.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some_and(|t| !t.cancelled)
    }

    /// Progress of the running task as `(direction, fraction)`.
    pub fn progress(&self) -> Option<(CrouchDirection, f32)> {
        self.task
            .filter(|t| !t.cancelled)
            .map(|t| (t.direction, t.fraction()))
    }

    /// Flag the running task as cancelled. It is discarded on the next poll.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.as_mut() {
            task.cancel();
        }
    }

    /// Start a transition `start_fraction` of the way through, superseding
    /// any running task.
    pub fn start(
        &mut self,
        direction: CrouchDirection,
        start_fraction: f32,
        config: &LocomotionConfig,
        params: &BuiltinParams,
        state: &mut LocomotionState,
    ) {
        if let Some(previous) = self.task.as_mut() {
            previous.cancel();
            log::debug!(
                "crouch task {:?} superseded at {:.2}",
                previous.direction,
                previous.fraction()
            );
        }

        // A new transition invalidates the result of the opposite one.
        match direction {
            CrouchDirection::Down => state.board.set(params.should_uncrouch, false),
            CrouchDirection::Up => state.board.set(params.should_crouch, false),
        };

        let duration = direction.duration(config);
        self.task = Some(CrouchTask {
            direction,
            elapsed: start_fraction.clamp(0.0, 1.0) * duration,
            duration,
            cancelled: false,
        });
    }

    /// Advance the running task by one frame.
    pub fn poll(
        &mut self,
        frame: CrouchFrame,
        config: &LocomotionConfig,
        params: &BuiltinParams,
        state: &mut LocomotionState,
        oracle: &dyn CollisionOracle,
    ) -> CrouchEvent {
        let mut reversed = false;

        // At most one reversal per frame: the reverse task only flips back
        // on the opposite input.
        for _ in 0..2 {
            let Some(task) = self.task else {
                return CrouchEvent::Idle;
            };
            if task.cancelled {
                self.task = None;
                return CrouchEvent::Idle;
            }

            let fraction = task.fraction();

            if task.elapsed >= task.duration {
                self.task = None;
                finish(task.direction, config, params, state);
                log::debug!("crouch task {:?} completed", task.direction);
                return CrouchEvent::Completed(task.direction);
            }

            match task.direction {
                CrouchDirection::Down => {
                    if !state.grounded {
                        self.task = None;
                        state.camera_height = config.standing_camera_height;
                        state.board.set(params.is_transitioning_crouch, false);
                        log::debug!("crouch aborted: left the ground");
                        return CrouchEvent::Aborted(CrouchDirection::Down);
                    }
                    if !frame.crouch_held && !reversed {
                        self.start(CrouchDirection::Up, 1.0 - fraction, config, params, state);
                        reversed = true;
                        continue;
                    }
                }
                CrouchDirection::Up => {
                    if frame.crouch_held && !reversed {
                        self.start(CrouchDirection::Down, 1.0 - fraction, config, params, state);
                        reversed = true;
                        continue;
                    }
                    if !sensor::can_uncrouch(oracle, config, state.position) {
                        self.task = None;
                        state.camera_height = config.crouched_camera_height;
                        state.board.set(params.is_transitioning_crouch, false);
                        log::debug!("uncrouch blocked: no headroom");
                        return CrouchEvent::Aborted(CrouchDirection::Up);
                    }
                }
            }

            let (from, to) = camera_endpoints(task.direction, config);
            state.camera_height = from + (to - from) * fraction;
            if let Some(running) = self.task.as_mut() {
                running.elapsed += frame.delta_time.max(0.0);
            }

            return if reversed {
                CrouchEvent::Reversed(task.direction)
            } else {
                CrouchEvent::Progress(task.direction)
            };
        }

        CrouchEvent::Idle
    }
}

fn camera_endpoints(direction: CrouchDirection, config: &LocomotionConfig) -> (f32, f32) {
    match direction {
        CrouchDirection::Down => (config.standing_camera_height, config.crouched_camera_height),
        CrouchDirection::Up => (config.crouched_camera_height, config.standing_camera_height),
    }
}

fn finish(
    direction: CrouchDirection,
    config: &LocomotionConfig,
    params: &BuiltinParams,
    state: &mut LocomotionState,
) {
    match direction {
        CrouchDirection::Down => {
            state.camera_height = config.crouched_camera_height;
            state.collider = ColliderShape {
                height: config.crouched_collider_height,
                center_offset: config.crouched_center_offset(),
            };
            state.board.set(params.should_crouch, true);
        }
        CrouchDirection::Up => {
            state.camera_height = config.standing_camera_height;
            state.collider = ColliderShape::standing(config.standing_collider_height);
            state.board.set(params.should_uncrouch, true);
        }
    }
    state.board.set(params.is_transitioning_crouch, false);
}

/// Camera offset for a camera height, used by the late update.
pub fn camera_offset(state: &LocomotionState) -> Vec3 {
    Vec3::Y * state.camera_height
}
