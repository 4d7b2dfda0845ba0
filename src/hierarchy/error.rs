//! Structural problems found while building a hierarchy.

use thiserror::Error;

/// A defect in the declared state hierarchy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HierarchyError {
    #[error("State name '{0}' is reserved for the top state")]
    ReservedName(String),

    #[error("State '{0}' is registered more than once")]
    DuplicateState(String),

    #[error("State '{state}' declares parent '{parent}', which has no handler")]
    MissingParent { state: String, parent: String },

    #[error("Superstate chain of '{state}' does not reach the top state within {limit} hops")]
    NonTerminating { state: String, limit: usize },

    #[error("State '{state}' is nested {depth} levels deep (limit: {limit})")]
    TooDeep {
        state: String,
        depth: usize,
        limit: usize,
    },

    #[error("Initial state '{0}' has no handler")]
    MissingInitial(String),
}
