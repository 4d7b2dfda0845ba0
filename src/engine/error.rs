//! Engine errors.

use crate::checkpoint::CheckpointError;
use thiserror::Error;

/// Errors raised by `init`, `dispatch` and `restore`.
///
/// Handler and topology defects raised by `init` or `dispatch` leave the
/// machine faulted: an exit/entry sequence may have stopped halfway, so the
/// instance must be discarded. Lifecycle errors, `ReservedSignal` and
/// anything returned by `restore` leave it untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HsmError {
    #[error("No handler registered for state '{state}'")]
    MissingHandler { state: String },

    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] TopologyError),

    #[error("Superstate chain of '{state}' exceeds {limit} hops")]
    NonTerminatingHierarchy { state: String, limit: usize },

    #[error("Handler of '{state}' answered {signal} with '{response}'")]
    InvalidResponse {
        state: String,
        signal: String,
        response: &'static str,
    },

    #[error("Control signal {0} cannot be dispatched")]
    ReservedSignal(String),

    #[error("Machine has not been initialized. Call .init() before .dispatch()")]
    NotInitialized,

    #[error("Machine is already initialized")]
    AlreadyInitialized,

    #[error("Machine faulted during an earlier operation and must be discarded")]
    Faulted,

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// Transition requests that contradict the declared hierarchy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TopologyError {
    #[error("'{from}' requested a transition to the top state")]
    TopTarget { from: String },

    #[error("No common ancestor between '{from}' and '{to}'")]
    NoCommonAncestor { from: String, to: String },

    #[error("'{state}' is not an ancestor of the active leaf '{leaf}'")]
    SourceNotActive { state: String, leaf: String },

    #[error("'{state}' designated '{child}' as initial substate, which is not its direct child")]
    InitNotChild { state: String, child: String },
}
