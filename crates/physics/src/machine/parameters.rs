//! Named boolean parameters driving state transitions.
//!
//! Names are resolved to [`ParamId`]s once, when the controller is built.
//! Per-frame reads and writes go through the ids and never fail.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const IS_GROUNDED: &str = "Is Grounded";
pub const IS_MOVING: &str = "Is Moving";
pub const RUN_INPUT: &str = "Run Input";
pub const CROUCH_INPUT: &str = "Crouch Input";
pub const JUMP_INPUT: &str = "Jump Input";
pub const CAN_JUMP: &str = "Can Jump";
pub const SHOULD_CROUCH: &str = "Should Crouch";
pub const SHOULD_UNCROUCH: &str = "Should Uncrouch";
pub const IS_TRANSITIONING_CROUCH: &str = "Is Transitioning Crouch";
pub const FINISHED_CROUCH_CALLBACK: &str = "Finished Crouch Callback";
pub const CAN_UNCROUCH: &str = "Can Uncrouch";
pub const CAN_UNCROUCH_AIR: &str = "Can Uncrouch Air";

/// Parameters the controller itself writes. Every board has them.
pub const BUILTIN_PARAMETERS: [&str; 12] = [
    IS_GROUNDED,
    IS_MOVING,
    RUN_INPUT,
    CROUCH_INPUT,
    JUMP_INPUT,
    CAN_JUMP,
    SHOULD_CROUCH,
    SHOULD_UNCROUCH,
    IS_TRANSITIONING_CROUCH,
    FINISHED_CROUCH_CALLBACK,
    CAN_UNCROUCH,
    CAN_UNCROUCH_AIR,
];

/// Stable index of a parameter on its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub u16);

/// Ordered set of named booleans.
///
/// Boards are small (a dozen or two entries) and names are only looked up
/// while building a controller, so lookup is a linear scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterBoard {
    names: Vec<String>,
    values: Vec<bool>,
}

impl ParameterBoard {
    /// A board holding every builtin parameter, all false.
    pub fn with_builtins() -> Self {
        let mut board = Self::default();
        for name in BUILTIN_PARAMETERS {
            // Builtin names are distinct, so this cannot fail.
            let _ = board.declare(name, false);
        }
        board
    }

    /// Add a parameter. Declaring a name twice is a configuration error.
    pub fn declare(&mut self, name: &str, default: bool) -> Result<ParamId, ConfigError> {
        if self.lookup(name).is_some() {
            return Err(ConfigError::DuplicateParameter(name.to_string()));
        }
        let id = ParamId(self.names.len() as u16);
        self.names.push(name.to_string());
        self.values.push(default);
        Ok(id)
    }

    /// Declare a parameter unless it already exists; then only its default changes.
    pub fn declare_or_reset(&mut self, name: &str, default: bool) -> ParamId {
        match self.lookup(name) {
            Some(id) => {
                self.set(id, default);
                id
            }
            None => {
                let id = ParamId(self.names.len() as u16);
                self.names.push(name.to_string());
                self.values.push(default);
                id
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ParamId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| ParamId(i as u16))
    }

    /// Resolve a name referenced from a state's transition.
    pub fn resolve(&self, state: &str, name: &str) -> Result<ParamId, ConfigError> {
        self.lookup(name).ok_or_else(|| ConfigError::UnknownParameter {
            state: state.to_string(),
            parameter: name.to_string(),
        })
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> bool {
        self.values.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Write a value. Returns true if it changed.
    #[inline]
    pub fn set(&mut self, id: ParamId, value: bool) -> bool {
        match self.values.get_mut(id.0 as usize) {
            Some(slot) if *slot != value => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Read by name, for diagnostics and tests.
    pub fn value_of(&self, name: &str) -> Option<bool> {
        self.lookup(name).map(|id| self.get(id))
    }

    pub fn name(&self, id: ParamId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(name, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Resolved ids of the builtin parameters.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinParams {
    pub is_grounded: ParamId,
    pub is_moving: ParamId,
    pub run_input: ParamId,
    pub crouch_input: ParamId,
    pub jump_input: ParamId,
    pub can_jump: ParamId,
    pub should_crouch: ParamId,
    pub should_uncrouch: ParamId,
    pub is_transitioning_crouch: ParamId,
    pub finished_crouch_callback: ParamId,
    pub can_uncrouch: ParamId,
    pub can_uncrouch_air: ParamId,
}

impl BuiltinParams {
    /// Resolve every builtin on `board`, declaring any that are missing.
    pub fn bind(board: &mut ParameterBoard) -> Self {
        let mut id = |name: &str| match board.lookup(name) {
            Some(id) => id,
            None => board.declare_or_reset(name, false),
        };
        Self {
            is_grounded: id(IS_GROUNDED),
            is_moving: id(IS_MOVING),
            run_input: id(RUN_INPUT),
            crouch_input: id(CROUCH_INPUT),
            jump_input: id(JUMP_INPUT),
            can_jump: id(CAN_JUMP),
            should_crouch: id(SHOULD_CROUCH),
            should_uncrouch: id(SHOULD_UNCROUCH),
            is_transitioning_crouch: id(IS_TRANSITIONING_CROUCH),
            finished_crouch_callback: id(FINISHED_CROUCH_CALLBACK),
            can_uncrouch: id(CAN_UNCROUCH),
            can_uncrouch_air: id(CAN_UNCROUCH_AIR),
        }
    }
}
