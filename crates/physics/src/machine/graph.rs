//! State graph: states, ordered transitions and their conditions.
//!
//! [`StateGraphConfig`] is the serializable description a designer edits.
//! [`StateGraph`] is the resolved form, with every parameter name turned
//! into a [`ParamId`] and every target checked.

use serde::{Deserialize, Serialize};

use super::parameters::{self as params, ParamId, ParameterBoard};
use crate::error::ConfigError;

/// Index of a state in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StateId(pub usize);

// ============================================================================
// Configuration
// ============================================================================

/// A parameter declared by the graph on top of the builtins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterConfig {
    pub name: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    pub parameter: String,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Index of the target state.
    pub to: usize,
    /// All must hold. An empty list always fires.
    #[serde(default)]
    pub conditions: Vec<ConditionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Behavior name, looked up in the registry.
    pub name: String,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

/// Serializable state graph. The first state is the initial one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateGraphConfig {
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
    pub states: Vec<StateConfig>,
}

pub const IDLE: usize = 0;
pub const WALK: usize = 1;
pub const RUN: usize = 2;
pub const JUMP: usize = 3;
pub const AIR: usize = 4;
pub const CROUCH: usize = 5;
pub const AIR_CROUCH: usize = 6;
pub const TO_CROUCH: usize = 7;
pub const FROM_CROUCH: usize = 8;
pub const AIR_CROUCH_TO_CROUCH: usize = 9;

fn when(conditions: &[(&str, bool)]) -> Vec<ConditionConfig> {
    conditions
        .iter()
        .map(|(parameter, value)| ConditionConfig {
            parameter: parameter.to_string(),
            value: *value,
        })
        .collect()
}

fn go(to: usize, conditions: &[(&str, bool)]) -> TransitionConfig {
    TransitionConfig {
        to,
        conditions: when(conditions),
    }
}

fn state(name: &str, transitions: Vec<TransitionConfig>) -> StateConfig {
    StateConfig {
        name: name.to_string(),
        transitions,
    }
}

impl Default for StateGraphConfig {
    /// The standard first-person graph.
    fn default() -> Self {
        use params::*;

        let jump = || go(JUMP, &[(JUMP_INPUT, true), (CAN_JUMP, true)]);
        let fall = || go(AIR, &[(IS_GROUNDED, false)]);
        let crouch = || go(TO_CROUCH, &[(CROUCH_INPUT, true)]);

        Self {
            parameters: Vec::new(),
            states: vec![
                state(
                    "Idle",
                    vec![
                        jump(),
                        fall(),
                        crouch(),
                        go(RUN, &[(IS_MOVING, true), (RUN_INPUT, true)]),
                        go(WALK, &[(IS_MOVING, true)]),
                    ],
                ),
                state(
                    "Walk",
                    vec![
                        jump(),
                        fall(),
                        crouch(),
                        go(IDLE, &[(IS_MOVING, false)]),
                        go(RUN, &[(RUN_INPUT, true)]),
                    ],
                ),
                state(
                    "Run",
                    vec![
                        jump(),
                        fall(),
                        crouch(),
                        go(IDLE, &[(IS_MOVING, false)]),
                        go(WALK, &[(RUN_INPUT, false)]),
                    ],
                ),
                state("Jump", vec![go(AIR, &[])]),
                state(
                    "Air",
                    vec![
                        go(AIR_CROUCH, &[(CROUCH_INPUT, true)]),
                        go(IDLE, &[(IS_GROUNDED, true), (IS_MOVING, false)]),
                        go(RUN, &[(IS_GROUNDED, true), (RUN_INPUT, true)]),
                        go(WALK, &[(IS_GROUNDED, true)]),
                    ],
                ),
                state(
                    "Crouch",
                    vec![
                        fall(),
                        go(FROM_CROUCH, &[(CROUCH_INPUT, false), (CAN_UNCROUCH, true)]),
                    ],
                ),
                state(
                    "Air Crouch",
                    vec![
                        go(AIR_CROUCH_TO_CROUCH, &[(IS_GROUNDED, true)]),
                        go(AIR, &[(CROUCH_INPUT, false), (CAN_UNCROUCH_AIR, true)]),
                    ],
                ),
                state(
                    "To Crouch",
                    vec![
                        fall(),
                        jump(),
                        go(CROUCH, &[(SHOULD_CROUCH, true)]),
                        go(IDLE, &[(SHOULD_UNCROUCH, true)]),
                        go(
                            IDLE,
                            &[
                                (IS_TRANSITIONING_CROUCH, false),
                                (FINISHED_CROUCH_CALLBACK, true),
                            ],
                        ),
                    ],
                ),
                state(
                    "From Crouch",
                    vec![
                        fall(),
                        go(IDLE, &[(SHOULD_UNCROUCH, true)]),
                        go(CROUCH, &[(SHOULD_CROUCH, true)]),
                        go(
                            CROUCH,
                            &[
                                (IS_TRANSITIONING_CROUCH, false),
                                (FINISHED_CROUCH_CALLBACK, true),
                            ],
                        ),
                    ],
                ),
                state("Air Crouch To Crouch", vec![go(CROUCH, &[])]),
            ],
        }
    }
}

// ============================================================================
// Resolved graph
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub param: ParamId,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: StateId,
    pub conditions: Vec<Condition>,
}

impl Transition {
    /// Conjunction of all conditions.
    pub fn is_satisfied(&self, board: &ParameterBoard) -> bool {
        self.conditions
            .iter()
            .all(|c| board.get(c.param) == c.required)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    pub name: String,
    pub transitions: Vec<Transition>,
}

/// Resolved state graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGraph {
    states: Vec<StateNode>,
}

impl StateGraph {
    /// Resolve a config against `board`.
    ///
    /// Graph parameters are declared on the board first. Every problem is
    /// collected; the graph is only returned if there were none.
    pub fn build(
        config: &StateGraphConfig,
        board: &mut ParameterBoard,
    ) -> Result<Self, Vec<ConfigError>> {
        let mut errors = Vec::new();

        for parameter in &config.parameters {
            if let Err(e) = board.declare(&parameter.name, parameter.default) {
                errors.push(e);
            }
        }

        if config.states.is_empty() {
            errors.push(ConfigError::EmptyGraph);
            return Err(errors);
        }

        let count = config.states.len();
        let mut states = Vec::with_capacity(count);
        for state in &config.states {
            let mut transitions = Vec::with_capacity(state.transitions.len());
            for transition in &state.transitions {
                if transition.to >= count {
                    errors.push(ConfigError::InvalidTarget {
                        state: state.name.clone(),
                        target: transition.to,
                        count,
                    });
                    continue;
                }

                let mut conditions = Vec::with_capacity(transition.conditions.len());
                for condition in &transition.conditions {
                    match board.resolve(&state.name, &condition.parameter) {
                        Ok(param) => conditions.push(Condition {
                            param,
                            required: condition.value,
                        }),
                        Err(e) => errors.push(e),
                    }
                }

                transitions.push(Transition {
                    target: StateId(transition.to),
                    conditions,
                });
            }

            states.push(StateNode {
                name: state.name.clone(),
                transitions,
            });
        }

        if errors.is_empty() {
            Ok(Self { states })
        } else {
            Err(errors)
        }
    }

    /// A graph with one state and no transitions.
    pub fn single(name: &str) -> Self {
        Self {
            states: vec![StateNode {
                name: name.to_string(),
                transitions: Vec::new(),
            }],
        }
    }

    /// First satisfied transition out of `active`, if any.
    pub fn evaluate(&self, active: StateId, board: &ParameterBoard) -> Option<StateId> {
        self.states
            .get(active.0)?
            .transitions
            .iter()
            .find(|t| t.is_satisfied(board))
            .map(|t| t.target)
    }

    pub fn state(&self, id: StateId) -> Option<&StateNode> {
        self.states.get(id.0)
    }

    pub fn name(&self, id: StateId) -> &str {
        self.states.get(id.0).map_or("<invalid>", |s| s.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name == name).map(StateId)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = &StateNode> {
        self.states.iter()
    }
}
