//! State behaviors and the registry that binds them to graph states.

use std::collections::BTreeMap;

use glam::Vec3;

use super::parameters::{BuiltinParams, ParamId};
use crate::collision::CollisionOracle;
use crate::error::ConfigError;
use crate::movement::{CrouchSequencer, LocomotionConfig, LocomotionInput, LocomotionState};

/// Everything a behavior hook may read or change.
pub struct StateContext<'a> {
    pub config: &'a LocomotionConfig,
    pub params: &'a BuiltinParams,
    pub state: &'a mut LocomotionState,
    pub sequencer: &'a mut CrouchSequencer,
    pub oracle: &'a dyn CollisionOracle,
    pub input: &'a LocomotionInput,
    /// World-space horizontal wish direction, zero without move input.
    pub wish_direction: Vec3,
    pub delta_time: f32,
}

impl StateContext<'_> {
    #[inline]
    pub fn param(&self, id: ParamId) -> bool {
        self.state.board.get(id)
    }

    #[inline]
    pub fn set_param(&mut self, id: ParamId, value: bool) {
        self.state.board.set(id, value);
    }
}

/// Per-state movement logic.
///
/// When the graph switches from `A` to `B` the hooks run as
/// `A.on_exit`, `B.on_enter`, `A.on_post_exit`. Switching a state onto
/// itself runs the same sequence.
pub trait StateBehavior {
    fn name(&self) -> &'static str;

    fn on_enter(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Runs every frame after transitions have been evaluated.
    fn update(&mut self, _ctx: &mut StateContext<'_>) {}

    fn fixed_update(&mut self, _ctx: &mut StateContext<'_>) {}

    fn late_update(&mut self, _ctx: &mut StateContext<'_>) {}

    fn on_exit(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Runs after the next state's `on_enter`.
    fn on_post_exit(&mut self, _ctx: &mut StateContext<'_>) {}
}

pub type BehaviorFactory = fn() -> Box<dyn StateBehavior>;

/// Name to constructor map used to instantiate the behaviors of a graph.
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
    factories: BTreeMap<String, BehaviorFactory>,
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in locomotion state.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::movement::states::register_standard(&mut registry);
        registry
    }

    /// Register a factory. A later registration for the same name replaces
    /// the earlier one.
    pub fn register(&mut self, name: &str, factory: BehaviorFactory) -> &mut Self {
        if self.factories.insert(name.to_string(), factory).is_some() {
            log::debug!("behavior `{name}` re-registered");
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn StateBehavior>, ConfigError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConfigError::MissingBehavior(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hover;

    impl StateBehavior for Hover {
        fn name(&self) -> &'static str {
            "Hover"
        }
    }

    fn hover() -> Box<dyn StateBehavior> {
        Box::new(Hover)
    }

    #[test]
    fn test_standard_registry_covers_default_graph() {
        let registry = BehaviorRegistry::standard();
        let graph = crate::machine::StateGraphConfig::default();
        for state in &graph.states {
            assert!(registry.contains(&state.name), "missing {}", state.name);
        }
    }

    #[test]
    fn test_created_behavior_reports_its_name() {
        let registry = BehaviorRegistry::standard();
        for name in registry.names() {
            let behavior = registry.create(name).expect("registered");
            assert_eq!(behavior.name(), name);
        }
    }

    #[test]
    fn test_missing_behavior_is_config_error() {
        let registry = BehaviorRegistry::new();
        assert_eq!(
            registry.create("Slide").err(),
            Some(ConfigError::MissingBehavior("Slide".into()))
        );
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = BehaviorRegistry::standard();
        registry.register("Hover", hover);
        assert!(registry.contains("Hover"));
        assert_eq!(registry.create("Hover").map(|b| b.name()).ok(), Some("Hover"));
    }
}
