//! Movement state machine.
//!
//! A [`StateGraph`] holds ordered states, each with ordered transitions
//! guarded by conjunctions of boolean conditions on a [`ParameterBoard`].
//! The first satisfied transition of the active state fires; at most one
//! fires per evaluation.
//!
//! Behaviors are plain Rust types implementing [`StateBehavior`]. They are
//! bound to graph states by name through a [`BehaviorRegistry`], so a
//! misspelled state is a configuration error at build time.

mod behavior;
mod graph;
pub mod parameters;

pub use behavior::{BehaviorFactory, BehaviorRegistry, StateBehavior, StateContext};
pub use graph::{
    Condition, ConditionConfig, ParameterConfig, StateConfig, StateGraph, StateGraphConfig,
    StateId, StateNode, Transition, TransitionConfig,
};
pub use parameters::{BuiltinParams, ParamId, ParameterBoard};

/// Indices of the states in [`StateGraphConfig::default`].
pub mod standard {
    pub use super::graph::{
        AIR, AIR_CROUCH, AIR_CROUCH_TO_CROUCH, CROUCH, FROM_CROUCH, IDLE, JUMP, RUN, TO_CROUCH,
        WALK,
    };
}
