//! Build errors for state machines.

use crate::hierarchy::HierarchyError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states registered. Add at least one with .state(...)")]
    NoStates,

    #[error("Invalid state hierarchy ({} problem(s)): {}", .0.len(), describe(.0))]
    InvalidHierarchy(Vec<HierarchyError>),
}

fn describe(errors: &[HierarchyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
