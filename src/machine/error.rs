//! Errors raised while compiling a state machine.

use thiserror::Error;

/// Startup-time violations found in a machine definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("State at position {index} has an empty slug")]
    EmptySlug { index: usize },

    #[error("Duplicate slug '{slug}' declared {count} times")]
    DuplicateSlug { slug: String, count: usize },

    #[error("No state uses the reserved start slug '{start}'")]
    MissingStartState { start: String },

    #[error("Invalid state machine: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<BuildError>),
}
