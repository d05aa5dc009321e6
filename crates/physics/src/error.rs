//! Configuration errors.
//!
//! Nothing in the per-frame path returns errors. Everything that can be
//! wrong with a controller is wrong at construction time, and is reported
//! once per offending entry.

use thiserror::Error;

/// A single problem found while building a locomotion controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("state graph has no states")]
    EmptyGraph,

    #[error("parameter `{0}` is declared more than once")]
    DuplicateParameter(String),

    #[error("state `{state}` has a transition condition on unknown parameter `{parameter}`")]
    UnknownParameter { state: String, parameter: String },

    #[error("state `{state}` has a transition to state index {target}, but only {count} states exist")]
    InvalidTarget {
        state: String,
        target: usize,
        count: usize,
    },

    #[error("no behavior registered for state `{0}`")]
    MissingBehavior(String),

    #[error("invalid locomotion setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// Every error collected while validating one controller.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} configuration error(s); first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }
}
