//! Built-in locomotion behaviors.
//!
//! Each state is a unit struct implementing [`StateBehavior`]. Ground states
//! steer with [`integrator::ground_accelerate`] using their gait, airborne
//! states with the configured air-strafe model.

use glam::Vec3;

use super::config::{AirStrafe, GaitSettings};
use super::crouch::CrouchDirection;
use super::integrator;
use super::sensor;
use super::state::ColliderShape;
use crate::machine::{BehaviorRegistry, StateBehavior, StateContext};

pub const IDLE: &str = "Idle";
pub const WALK: &str = "Walk";
pub const RUN: &str = "Run";
pub const JUMP: &str = "Jump";
pub const AIR: &str = "Air";
pub const CROUCH: &str = "Crouch";
pub const AIR_CROUCH: &str = "Air Crouch";
pub const TO_CROUCH: &str = "To Crouch";
pub const FROM_CROUCH: &str = "From Crouch";
pub const AIR_CROUCH_TO_CROUCH: &str = "Air Crouch To Crouch";

/// Register every built-in behavior under its state name.
pub fn register_standard(registry: &mut BehaviorRegistry) {
    registry
        .register(IDLE, || Box::new(IdleState))
        .register(WALK, || Box::new(WalkState))
        .register(RUN, || Box::new(RunState))
        .register(JUMP, || Box::new(JumpState))
        .register(AIR, || Box::new(AirState))
        .register(CROUCH, || Box::new(CrouchState))
        .register(AIR_CROUCH, || Box::new(AirCrouchState))
        .register(TO_CROUCH, || Box::new(ToCrouchState))
        .register(FROM_CROUCH, || Box::new(FromCrouchState))
        .register(AIR_CROUCH_TO_CROUCH, || Box::new(AirCrouchToCrouchState));
}

// ============================================================================
// Shared movement
// ============================================================================

fn ground_move(ctx: &mut StateContext<'_>, gait: GaitSettings) {
    if !gait.enabled {
        return;
    }
    integrator::ground_accelerate(
        &mut ctx.state.velocity,
        ctx.wish_direction,
        gait.max_speed,
        gait.acceleration,
        ctx.delta_time,
    );
}

fn air_move(ctx: &mut StateContext<'_>) {
    ctx.state.snap_offset = 0.0;

    let config = ctx.config;
    match config.air_strafe {
        AirStrafe::None => {}
        AirStrafe::Normal => integrator::normal_air_accelerate(
            &mut ctx.state.velocity,
            ctx.wish_direction,
            config.max_air_acceleration,
            config.air_acceleration,
        ),
        AirStrafe::SourceStyle => {
            let ground_normal = ctx.state.grounded.then_some(ctx.state.ground_normal);
            integrator::source_air_accelerate(
                &mut ctx.state.velocity,
                ctx.wish_direction,
                config.max_air_acceleration,
                config.air_acceleration,
                ctx.delta_time,
                ground_normal,
            );
        }
    }
}

/// Change the camera height while keeping the eye where it is in the world.
fn shift_camera_keep_eye(ctx: &mut StateContext<'_>, camera_height: f32) {
    let old = ctx.state.camera_height;
    ctx.state.camera_height = camera_height;
    ctx.state.position += Vec3::Y * (old - camera_height);
}

fn crouched_collider(ctx: &StateContext<'_>, center_offset: f32) -> ColliderShape {
    ColliderShape {
        height: ctx.config.crouched_collider_height,
        center_offset,
    }
}

fn begin_crouch_transition(ctx: &mut StateContext<'_>, direction: CrouchDirection) {
    let params = ctx.params;
    ctx.set_param(params.is_transitioning_crouch, true);
    ctx.set_param(params.finished_crouch_callback, true);
    ctx.sequencer
        .start(direction, 0.0, ctx.config, ctx.params, &mut *ctx.state);
}

// ============================================================================
// Ground states
// ============================================================================

/// Friction alone brings the body to rest.
pub struct IdleState;

impl StateBehavior for IdleState {
    fn name(&self) -> &'static str {
        IDLE
    }
}

pub struct WalkState;

impl StateBehavior for WalkState {
    fn name(&self) -> &'static str {
        WALK
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        let gait = ctx.config.walking;
        ground_move(ctx, gait);
    }
}

pub struct RunState;

impl StateBehavior for RunState {
    fn name(&self) -> &'static str {
        RUN
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        let gait = ctx.config.running;
        ground_move(ctx, gait);
    }
}

pub struct CrouchState;

impl StateBehavior for CrouchState {
    fn name(&self) -> &'static str {
        CROUCH
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        let params = ctx.params;
        ctx.set_param(params.should_crouch, false);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        let gait = ctx.config.crouching;
        ground_move(ctx, gait);

        let clear = sensor::can_uncrouch(ctx.oracle, ctx.config, ctx.state.position);
        let params = ctx.params;
        ctx.set_param(params.can_uncrouch, clear);
    }

    fn on_post_exit(&mut self, ctx: &mut StateContext<'_>) {
        let params = ctx.params;
        ctx.set_param(params.should_uncrouch, false);
    }
}

// ============================================================================
// Airborne states
// ============================================================================

pub struct JumpState;

impl StateBehavior for JumpState {
    fn name(&self) -> &'static str {
        JUMP
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        ctx.state.snap_offset = 0.0;
        ctx.state.velocity.y =
            integrator::jump_launch_speed(ctx.config.jump_force, ctx.config.gravity_y());
        log::debug!("jump: launch speed {:.3}", ctx.state.velocity.y);
    }
}

pub struct AirState;

impl StateBehavior for AirState {
    fn name(&self) -> &'static str {
        AIR
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        // Any half-finished crouch is dropped and the standing shape restored.
        ctx.sequencer.cancel();
        let params = ctx.params;
        ctx.set_param(params.is_transitioning_crouch, false);
        ctx.state.camera_height = ctx.config.standing_camera_height;
        ctx.state.collider = ColliderShape::standing(ctx.config.standing_collider_height);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        air_move(ctx);
    }
}

pub struct AirCrouchState;

impl StateBehavior for AirCrouchState {
    fn name(&self) -> &'static str {
        AIR_CROUCH
    }

    /// Tuck the legs: the collider shrinks toward the head and the eye keeps
    /// its world height.
    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        let camera_height = ctx.config.standing_camera_height;
        ctx.state.collider = crouched_collider(ctx, ctx.config.air_crouched_center_offset());
        shift_camera_keep_eye(ctx, camera_height);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        air_move(ctx);

        let clear = sensor::can_uncrouch_air(ctx.oracle, ctx.config, ctx.state.position);
        let params = ctx.params;
        ctx.set_param(params.can_uncrouch_air, clear);
    }
}

pub struct AirCrouchToCrouchState;

impl StateBehavior for AirCrouchToCrouchState {
    fn name(&self) -> &'static str {
        AIR_CROUCH_TO_CROUCH
    }

    /// Landed tucked: switch to the ground crouch shape without moving the
    /// capsule or the eye in world space.
    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        let camera_height = ctx.config.crouched_camera_height;
        ctx.state.collider = crouched_collider(ctx, ctx.config.crouched_center_offset());
        shift_camera_keep_eye(ctx, camera_height);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        let gait = ctx.config.crouching;
        ground_move(ctx, gait);
    }
}

// ============================================================================
// Crouch transitions
// ============================================================================

pub struct ToCrouchState;

impl StateBehavior for ToCrouchState {
    fn name(&self) -> &'static str {
        TO_CROUCH
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        begin_crouch_transition(ctx, CrouchDirection::Down);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        let gait = ctx.config.crouching;
        ground_move(ctx, gait);
    }

    fn on_post_exit(&mut self, ctx: &mut StateContext<'_>) {
        let params = ctx.params;
        ctx.set_param(params.finished_crouch_callback, false);
    }
}

pub struct FromCrouchState;

impl StateBehavior for FromCrouchState {
    fn name(&self) -> &'static str {
        FROM_CROUCH
    }

    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        begin_crouch_transition(ctx, CrouchDirection::Up);
    }

    fn update(&mut self, ctx: &mut StateContext<'_>) {
        let gait = ctx.config.crouching;
        ground_move(ctx, gait);
    }

    fn on_post_exit(&mut self, ctx: &mut StateContext<'_>) {
        let params = ctx.params;
        ctx.set_param(params.finished_crouch_callback, false);
    }
}
