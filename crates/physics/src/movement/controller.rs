//! Locomotion controller.
//!
//! This is the main entry point for character movement. It owns the state
//! graph, the behaviors bound to it and the per-entity [`LocomotionState`],
//! and runs the frame pipeline against a [`CollisionOracle`].

use glam::Vec3;

use crate::collision::CollisionOracle;
use crate::error::{ConfigError, ConfigErrors};
use crate::machine::{
    BehaviorRegistry, BuiltinParams, ParameterBoard, StateBehavior, StateContext, StateGraph,
    StateGraphConfig, StateId,
};

use super::config::LocomotionConfig;
use super::crouch::{self, CrouchDirection, CrouchFrame, CrouchSequencer};
use super::integrator;
use super::motor::{self, MotorSettings};
use super::sensor;
use super::state::{
    CameraPose, CameraSink, ColliderShape, CollisionFlags, LocomotionInput, LocomotionState,
};
use super::states::{IdleState, IDLE};

/// Largest time step a single update integrates (~15 FPS).
const MAX_FRAME_TIME: f32 = 0.066;

/// Upward speed above which ground contact does not count as grounded.
const RISING_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
enum Hook {
    Enter,
    Update,
    FixedUpdate,
    LateUpdate,
    Exit,
    PostExit,
}

impl Hook {
    fn call(self, behavior: &mut dyn StateBehavior, ctx: &mut StateContext<'_>) {
        match self {
            Hook::Enter => behavior.on_enter(ctx),
            Hook::Update => behavior.update(ctx),
            Hook::FixedUpdate => behavior.fixed_update(ctx),
            Hook::LateUpdate => behavior.late_update(ctx),
            Hook::Exit => behavior.on_exit(ctx),
            Hook::PostExit => behavior.on_post_exit(ctx),
        }
    }
}

/// Capsule locomotion controller for one entity.
///
/// # Example
///
/// ```ignore
/// let mut controller = LocomotionController::new(
///     LocomotionConfig::default(),
///     &StateGraphConfig::default(),
///     &BehaviorRegistry::standard(),
/// );
/// controller.set_position(spawn_position);
///
/// // Each frame:
/// controller.update(&input, &world, delta_time);
/// controller.late_update(&input, &world, delta_time, &mut camera);
/// ```
pub struct LocomotionController {
    config: LocomotionConfig,
    motor: MotorSettings,
    graph: StateGraph,
    /// One behavior per graph state, indexed by [`StateId`].
    behaviors: Vec<Box<dyn StateBehavior>>,
    params: BuiltinParams,
    state: LocomotionState,
    sequencer: CrouchSequencer,
    diagnostics: Vec<ConfigError>,
    entered: bool,
}

impl std::fmt::Debug for LocomotionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocomotionController")
            .field("active_state", &self.active_state_name())
            .field("position", &self.state.position)
            .field("velocity", &self.state.velocity)
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl LocomotionController {
    /// Build a controller.
    ///
    /// Configuration errors never fail construction. Each one is logged, kept
    /// in [`diagnostics`](Self::diagnostics), and the controller runs
    /// degraded with only the first configured state. Invalid settings are
    /// replaced by [`LocomotionConfig::default`].
    pub fn new(
        config: LocomotionConfig,
        graph: &StateGraphConfig,
        registry: &BehaviorRegistry,
    ) -> Self {
        let controller = Self::assemble(config, graph, registry);
        if controller.is_degraded() {
            for error in &controller.diagnostics {
                log::error!("locomotion config: {error}");
            }
            log::warn!(
                "locomotion controller degraded to state `{}` after {} error(s)",
                controller.active_state_name(),
                controller.diagnostics.len()
            );
        }
        controller
    }

    /// Build a controller, failing on any configuration error.
    pub fn try_new(
        config: LocomotionConfig,
        graph: &StateGraphConfig,
        registry: &BehaviorRegistry,
    ) -> Result<Self, ConfigErrors> {
        let controller = Self::assemble(config, graph, registry);
        if controller.is_degraded() {
            return Err(ConfigErrors(controller.diagnostics));
        }
        Ok(controller)
    }

    /// Controller with the default config, graph and behaviors.
    pub fn standard() -> Self {
        Self::new(
            LocomotionConfig::default(),
            &StateGraphConfig::default(),
            &BehaviorRegistry::standard(),
        )
    }

    fn assemble(
        config: LocomotionConfig,
        graph_config: &StateGraphConfig,
        registry: &BehaviorRegistry,
    ) -> Self {
        let mut errors = config.validate();
        // Invalid settings would break the integrator, run on defaults instead
        let config = if errors.is_empty() {
            config
        } else {
            LocomotionConfig::default()
        };
        let mut board = ParameterBoard::with_builtins();

        let mut behaviors = Vec::new();
        let graph = match StateGraph::build(graph_config, &mut board) {
            Ok(graph) => {
                for node in graph.states() {
                    match registry.create(&node.name) {
                        Ok(behavior) => behaviors.push(behavior),
                        Err(e) => errors.push(e),
                    }
                }
                Some(graph)
            }
            Err(graph_errors) => {
                errors.extend(graph_errors);
                None
            }
        };

        let graph = match graph {
            Some(graph) if errors.is_empty() => graph,
            _ => {
                let name = graph_config
                    .states
                    .first()
                    .map_or(IDLE, |state| state.name.as_str());
                let behavior = registry
                    .create(name)
                    .unwrap_or_else(|_| Box::new(IdleState) as Box<dyn StateBehavior>);

                board = ParameterBoard::with_builtins();
                behaviors = vec![behavior];
                StateGraph::single(name)
            }
        };

        let params = BuiltinParams::bind(&mut board);
        let state = LocomotionState::new(
            Vec3::ZERO,
            ColliderShape::standing(config.standing_collider_height),
            config.standing_camera_height,
            board,
        );

        Self {
            motor: MotorSettings::from_config(&config),
            config,
            graph,
            behaviors,
            params,
            state,
            sequencer: CrouchSequencer::new(),
            diagnostics: errors,
            entered: false,
        }
    }

    // ========================================================================
    // Frame phases
    // ========================================================================

    /// Run one frame of movement.
    pub fn update(&mut self, input: &LocomotionInput, oracle: &dyn CollisionOracle, delta_time: f32) {
        let dt = delta_time.min(MAX_FRAME_TIME);
        if !(dt > 0.0) {
            return;
        }

        self.enter_initial_state(input, oracle, dt);

        // Ground and ceiling
        let report = sensor::sense_ground(
            oracle,
            &self.config,
            self.state.position,
            &self.state.collider,
            self.state.velocity.y,
        );
        let grounded = report.grounded && self.state.velocity.y <= RISING_SPEED;
        self.state.grounded = grounded;
        self.state.ground_normal = report.normal;
        self.state.slope_angle = report.slope_angle;
        self.state.slope_exceeded = report.slope_exceeded;
        if grounded {
            self.state.can_hit_ceiling = true;
        }

        let ceiling = sensor::sense_ceiling(
            oracle,
            &self.config,
            self.state.position,
            &self.state.collider,
        );
        sensor::resolve_ceiling(&mut self.state, ceiling);

        // Friction and gravity
        if grounded && !input.has_movement_input() {
            integrator::apply_friction(
                &mut self.state.velocity,
                self.config.friction,
                self.config.stop_speed,
                dt,
            );
        }
        if report.slope_exceeded && !grounded {
            integrator::apply_slope_gravity(
                &mut self.state.velocity,
                self.config.gravity,
                report.normal,
                dt,
            );
        } else {
            integrator::apply_gravity(
                &mut self.state.velocity,
                self.config.gravity,
                grounded,
                self.config.ground_stick_speed,
                dt,
            );
        }
        self.state.snap_offset = if grounded { report.snap_offset } else { 0.0 };

        // State machine
        self.refresh_parameters(input);
        self.evaluate_transition(input, oracle, dt);
        self.run_hook(self.state.active_state, Hook::Update, input, oracle, dt);

        let event = self.sequencer.poll(
            CrouchFrame {
                crouch_held: self.state.board.get(self.params.crouch_input),
                delta_time: dt,
            },
            &self.config,
            &self.params,
            &mut self.state,
            oracle,
        );
        log::trace!("crouch sequencer: {event:?}");

        self.apply_displacement(oracle, dt);
    }

    /// Fixed-rate hook of the active state.
    pub fn fixed_update(&mut self, input: &LocomotionInput, oracle: &dyn CollisionOracle, delta_time: f32) {
        if !self.entered {
            return;
        }
        self.run_hook(self.state.active_state, Hook::FixedUpdate, input, oracle, delta_time);
    }

    /// Late phase: the active state's late hook, then look and camera.
    pub fn late_update(
        &mut self,
        input: &LocomotionInput,
        oracle: &dyn CollisionOracle,
        delta_time: f32,
        camera: &mut dyn CameraSink,
    ) {
        let dt = delta_time.min(MAX_FRAME_TIME).max(0.0);
        if self.entered {
            self.run_hook(self.state.active_state, Hook::LateUpdate, input, oracle, dt);
        }

        let look = input.look_delta * dt * self.config.sensitivity;
        self.state.yaw = (self.state.yaw + look.x * self.config.sensitivity_x).rem_euclid(360.0);
        self.state.pitch = (self.state.pitch - look.y * self.config.sensitivity_y)
            .clamp(self.config.min_look_angle, self.config.max_look_angle);

        camera.apply_pose(&CameraPose {
            pitch: self.state.pitch,
            yaw: self.state.yaw,
            local_offset: crouch::camera_offset(&self.state),
        });
    }

    // ========================================================================
    // Pipeline steps
    // ========================================================================

    fn enter_initial_state(&mut self, input: &LocomotionInput, oracle: &dyn CollisionOracle, dt: f32) {
        if self.entered {
            return;
        }
        self.entered = true;
        log::debug!("locomotion starts in `{}`", self.active_state_name());
        self.run_hook(self.state.active_state, Hook::Enter, input, oracle, dt);
    }

    fn refresh_parameters(&mut self, input: &LocomotionInput) {
        let p = self.params;
        let config = &self.config;
        let state = &mut self.state;
        let grounded = state.grounded;

        state.board.set(p.is_grounded, grounded);
        state.board.set(p.is_moving, input.has_movement_input());
        state.board.set(p.run_input, input.run && config.running.enabled);
        state.board.set(p.crouch_input, input.crouch && config.crouching.enabled);
        state.board.set(p.jump_input, input.jump);
        state.board.set(
            p.can_jump,
            grounded && state.velocity.y <= 0.0 && config.can_jump,
        );
    }

    /// Fire at most one transition out of the active state.
    fn evaluate_transition(&mut self, input: &LocomotionInput, oracle: &dyn CollisionOracle, dt: f32) {
        let current = self.state.active_state;
        let Some(next) = self.graph.evaluate(current, &self.state.board) else {
            return;
        };

        log::debug!(
            "locomotion: {} -> {}",
            self.graph.name(current),
            self.graph.name(next)
        );

        self.run_hook(current, Hook::Exit, input, oracle, dt);
        self.state.active_state = next;
        self.run_hook(next, Hook::Enter, input, oracle, dt);
        self.run_hook(current, Hook::PostExit, input, oracle, dt);
    }

    fn run_hook(
        &mut self,
        id: StateId,
        hook: Hook,
        input: &LocomotionInput,
        oracle: &dyn CollisionOracle,
        dt: f32,
    ) {
        let wish_direction = self.state.wish_direction(input.move_axis);
        let Self {
            config,
            params,
            state,
            sequencer,
            behaviors,
            ..
        } = self;

        let Some(behavior) = behaviors.get_mut(id.0) else {
            return;
        };

        let mut ctx = StateContext {
            config,
            params,
            state,
            sequencer,
            oracle,
            input,
            wish_direction,
            delta_time: dt,
        };
        hook.call(behavior.as_mut(), &mut ctx);
    }

    /// Move the capsule by `velocity * dt + snap` and react to what it hit.
    fn apply_displacement(&mut self, oracle: &dyn CollisionOracle, dt: f32) {
        let state = &mut self.state;
        let capsule = state.collider.capsule_at(state.position, self.config.radius);
        let displacement = state.velocity * dt + Vec3::Y * state.snap_offset;

        let result = motor::step_slide_move(oracle, capsule, displacement, &self.motor, state.grounded);
        state.position += result.offset;
        state.collision_flags = result.flags;

        for normal in &result.normals {
            match CollisionFlags::from_normal(*normal) {
                CollisionFlags::SIDES => integrator::clip_into_surface(&mut state.velocity, *normal),
                CollisionFlags::ABOVE if state.can_hit_ceiling || !state.grounded => {
                    integrator::clip_into_surface(&mut state.velocity, *normal);
                    state.can_hit_ceiling = false;
                }
                _ if !state.grounded => integrator::clip_into_surface(&mut state.velocity, *normal),
                _ => {}
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn active_state(&self) -> StateId {
        self.state.active_state
    }

    pub fn active_state_name(&self) -> &str {
        self.graph.name(self.state.active_state)
    }

    /// Current value of a named parameter.
    pub fn parameter(&self, name: &str) -> Option<bool> {
        self.state.board.value_of(name)
    }

    /// Direction and fraction of the running crouch transition.
    pub fn crouch_progress(&self) -> Option<(CrouchDirection, f32)> {
        self.sequencer.progress()
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// Teleport the entity. Velocity is kept.
    pub fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.state.velocity = velocity;
    }

    /// Turn the body to face `yaw` degrees.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.state.yaw = yaw.rem_euclid(360.0);
    }

    /// True if configuration errors forced the single-state fallback.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[ConfigError] {
        &self.diagnostics
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionWorld, LayerMask};
    use crate::machine::{ConditionConfig, StateConfig, TransitionConfig};
    use glam::Vec2;

    const DT: f32 = 0.02;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            LayerMask::GROUND,
        );
        world
    }

    fn spawn() -> LocomotionController {
        let mut controller = LocomotionController::standard();
        controller.set_position(Vec3::new(0.0, 1.01, 0.0));
        controller
    }

    fn forward() -> LocomotionInput {
        LocomotionInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct RecordingCamera {
        poses: Vec<CameraPose>,
    }

    impl CameraSink for RecordingCamera {
        fn apply_pose(&mut self, pose: &CameraPose) {
            self.poses.push(*pose);
        }
    }

    #[test]
    fn test_standard_controller_is_healthy() {
        let controller = LocomotionController::standard();
        assert!(!controller.is_degraded());
        assert_eq!(controller.active_state_name(), "Idle");
        assert_eq!(controller.graph().len(), 10);
    }

    #[test]
    fn test_idle_on_floor_is_grounded() {
        let world = floor_world();
        let mut controller = spawn();

        for _ in 0..10 {
            controller.update(&LocomotionInput::default(), &world, DT);
        }

        assert_eq!(controller.active_state_name(), "Idle");
        assert_eq!(controller.parameter("Is Grounded"), Some(true));
        assert!((controller.position().y - 1.01).abs() < 0.02);
        assert!(controller.state().collision_flags.has(CollisionFlags::BELOW));
    }

    #[test]
    fn test_walk_converges_without_overshoot() {
        let world = floor_world();
        let mut controller = spawn();
        let input = forward();

        let mut previous = 0.0;
        for frame in 0..60 {
            controller.update(&input, &world, DT);
            let speed = controller.state().horizontal_speed();
            assert!(speed >= previous - 1e-4, "frame {frame}: {speed} < {previous}");
            assert!(speed <= 4.0 + 1e-4, "frame {frame}: overshoot {speed}");
            previous = speed;
        }

        assert_eq!(controller.active_state_name(), "Walk");
        assert!((previous - 4.0).abs() < 1e-3);
        assert!(controller.position().x > 3.0, "walked along +X");
    }

    #[test]
    fn test_idle_walk_flip_once_per_frame() {
        let world = floor_world();
        let mut controller = spawn();

        let run_forward = LocomotionInput {
            run: true,
            ..forward()
        };

        controller.update(&LocomotionInput::default(), &world, DT);
        assert_eq!(controller.active_state_name(), "Idle");

        controller.update(&forward(), &world, DT);
        assert_eq!(controller.active_state_name(), "Walk");

        // Walk -> Run and Run -> Idle both apply, one per frame
        controller.update(&run_forward, &world, DT);
        assert_eq!(controller.active_state_name(), "Run");

        controller.update(&LocomotionInput::default(), &world, DT);
        assert_eq!(controller.active_state_name(), "Idle");

        controller.update(&forward(), &world, DT);
        assert_eq!(controller.active_state_name(), "Walk");
    }

    #[test]
    fn test_disabled_run_gait_keeps_walking() {
        let world = floor_world();
        let mut config = LocomotionConfig::default();
        config.running.enabled = false;
        let mut controller = LocomotionController::new(
            config,
            &StateGraphConfig::default(),
            &BehaviorRegistry::standard(),
        );
        controller.set_position(Vec3::new(0.0, 1.01, 0.0));

        let input = LocomotionInput {
            run: true,
            ..forward()
        };
        for _ in 0..5 {
            controller.update(&input, &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Walk");
        assert_eq!(controller.parameter("Run Input"), Some(false));
    }

    #[test]
    fn test_jump_and_land() {
        let world = floor_world();
        let mut controller = spawn();
        controller.update(&LocomotionInput::default(), &world, DT);

        let jump = LocomotionInput {
            jump: true,
            ..Default::default()
        };
        controller.update(&jump, &world, DT);
        assert_eq!(controller.active_state_name(), "Jump");
        assert!(controller.velocity().y > 8.0);

        controller.update(&LocomotionInput::default(), &world, DT);
        assert_eq!(controller.active_state_name(), "Air");

        let mut apex: f32 = 0.0;
        for _ in 0..150 {
            controller.update(&LocomotionInput::default(), &world, DT);
            apex = apex.max(controller.position().y);
        }

        // Launch speed is tuned for a 4 m apex
        assert!(apex > 4.5, "apex {apex}");
        assert_eq!(controller.active_state_name(), "Idle");
        assert!((controller.position().y - 1.01).abs() < 0.05);
    }

    #[test]
    fn test_cannot_jump_when_disabled() {
        let world = floor_world();
        let config = LocomotionConfig {
            can_jump: false,
            ..Default::default()
        };
        let mut controller = LocomotionController::new(
            config,
            &StateGraphConfig::default(),
            &BehaviorRegistry::standard(),
        );
        controller.set_position(Vec3::new(0.0, 1.01, 0.0));

        let jump = LocomotionInput {
            jump: true,
            ..Default::default()
        };
        for _ in 0..3 {
            controller.update(&jump, &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Idle");
        assert_eq!(controller.parameter("Can Jump"), Some(false));
    }

    #[test]
    fn test_walking_off_ledge_falls() {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(2.0, 0.5, 2.0),
            LayerMask::GROUND,
        );
        let mut controller = spawn();

        for _ in 0..120 {
            controller.update(&forward(), &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Air");
        assert!(controller.position().y < 0.0);
    }

    #[test]
    fn test_crouch_blocked_by_ceiling() {
        let mut world = floor_world();
        let ceiling = world.add_kinematic_box(
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(5.0, 0.5, 5.0),
            LayerMask::DEFAULT,
        );
        let mut controller = spawn();

        let crouch = LocomotionInput {
            crouch: true,
            ..Default::default()
        };
        controller.update(&crouch, &world, DT);
        assert_eq!(controller.active_state_name(), "To Crouch");
        assert!(controller.crouch_progress().is_some());

        for _ in 0..30 {
            controller.update(&crouch, &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Crouch");
        assert_eq!(controller.state().collider.height, 1.5);
        assert!((controller.state().camera_height - 0.25).abs() < 1e-5);

        // Ceiling low enough for the crouched capsule only
        world.set_brush_center(ceiling, Vec3::new(0.0, 2.3, 0.0));
        controller.update(&crouch, &world, DT);
        assert_eq!(controller.parameter("Can Uncrouch"), Some(false));

        for _ in 0..30 {
            controller.update(&LocomotionInput::default(), &world, DT);
            assert_eq!(controller.state().collider.height, 1.5);
        }
        assert_eq!(controller.active_state_name(), "Crouch");

        // Ceiling gone: stand back up
        world.set_brush_center(ceiling, Vec3::new(0.0, 50.0, 0.0));
        for _ in 0..40 {
            controller.update(&LocomotionInput::default(), &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Idle");
        assert_eq!(controller.state().collider.height, 2.0);
        assert!((controller.state().camera_height - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_released_crouch_reverses_to_idle() {
        let world = floor_world();
        let mut controller = spawn();

        let crouch = LocomotionInput {
            crouch: true,
            ..Default::default()
        };
        for _ in 0..5 {
            controller.update(&crouch, &world, DT);
        }
        assert_eq!(controller.active_state_name(), "To Crouch");

        controller.update(&LocomotionInput::default(), &world, DT);
        assert_eq!(
            controller.crouch_progress().map(|(direction, _)| direction),
            Some(CrouchDirection::Up)
        );

        for _ in 0..20 {
            controller.update(&LocomotionInput::default(), &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Idle");
        assert_eq!(controller.state().collider.height, 2.0);
    }

    #[test]
    fn test_late_update_turns_and_clamps_pitch() {
        let world = floor_world();
        let mut controller = spawn();
        let mut camera = RecordingCamera::default();

        let look = LocomotionInput {
            look_delta: Vec2::new(2.0, -1000.0),
            ..Default::default()
        };
        controller.late_update(&look, &world, 0.05, &mut camera);

        let pose = camera.poses.last().copied().expect("pose written");
        assert!((pose.yaw - 1.0).abs() < 1e-4);
        assert_eq!(pose.pitch, 90.0);
        assert!((pose.local_offset - Vec3::Y * 0.75).length() < 1e-6);
        assert_eq!(camera.poses.len(), 1);
    }

    #[test]
    fn test_zero_delta_time_is_noop() {
        let world = floor_world();
        let mut controller = spawn();
        let before = controller.position();

        controller.update(&forward(), &world, 0.0);
        assert_eq!(controller.position(), before);
        assert_eq!(controller.velocity(), Vec3::ZERO);
    }

    fn broken_graph() -> StateGraphConfig {
        StateGraphConfig {
            parameters: Vec::new(),
            states: vec![
                StateConfig {
                    name: "Idle".into(),
                    transitions: vec![
                        TransitionConfig {
                            to: 7,
                            conditions: Vec::new(),
                        },
                        TransitionConfig {
                            to: 1,
                            conditions: vec![ConditionConfig {
                                parameter: "Is Swimming".into(),
                                value: true,
                            }],
                        },
                    ],
                },
                StateConfig {
                    name: "Slide".into(),
                    transitions: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_bad_graph_runs_degraded() {
        let world = floor_world();
        let mut controller = LocomotionController::new(
            LocomotionConfig::default(),
            &broken_graph(),
            &BehaviorRegistry::standard(),
        );
        controller.set_position(Vec3::new(0.0, 1.01, 0.0));

        assert!(controller.is_degraded());
        assert!(controller.diagnostics().len() >= 2);
        assert_eq!(controller.graph().len(), 1);

        let jump = LocomotionInput {
            jump: true,
            ..forward()
        };
        for _ in 0..10 {
            controller.update(&jump, &world, DT);
        }
        assert_eq!(controller.active_state_name(), "Idle");
        assert!(controller.velocity().y <= 0.0);
    }

    #[test]
    fn test_try_new_reports_every_error() {
        let err = LocomotionController::try_new(
            LocomotionConfig::default(),
            &broken_graph(),
            &BehaviorRegistry::standard(),
        )
        .expect_err("graph is broken");

        assert!(err.iter().any(|e| matches!(e, ConfigError::InvalidTarget { target: 7, .. })));
        assert!(err
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownParameter { parameter, .. } if parameter == "Is Swimming")));
    }

    #[test]
    fn test_invalid_settings_degrade() {
        let config = LocomotionConfig {
            radius: -1.0,
            ..Default::default()
        };
        let controller = LocomotionController::new(
            config,
            &StateGraphConfig::default(),
            &BehaviorRegistry::standard(),
        );
        assert!(controller.is_degraded());
        assert_eq!(controller.active_state_name(), "Idle");
        assert!(controller
            .diagnostics()
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidSetting { field: "radius", .. })));
        assert_eq!(controller.config(), &LocomotionConfig::default());
    }

    #[test]
    fn test_inverted_look_range_keeps_running() {
        let world = floor_world();
        let config = LocomotionConfig {
            min_look_angle: 10.0,
            max_look_angle: -10.0,
            ..Default::default()
        };
        let mut controller = LocomotionController::new(
            config,
            &StateGraphConfig::default(),
            &BehaviorRegistry::standard(),
        );
        controller.set_position(Vec3::new(0.0, 1.01, 0.0));
        assert!(controller.is_degraded());

        let mut camera = RecordingCamera::default();
        let look = LocomotionInput {
            look_delta: Vec2::new(0.0, -1000.0),
            ..forward()
        };
        for _ in 0..5 {
            controller.update(&look, &world, DT);
            controller.fixed_update(&look, &world, DT);
            controller.late_update(&look, &world, DT, &mut camera);
        }

        assert_eq!(camera.poses.len(), 5);
        assert_eq!(controller.state().pitch, LocomotionConfig::default().max_look_angle);
        assert_eq!(controller.active_state_name(), "Idle");
    }
}
