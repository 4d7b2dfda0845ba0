//! Builder API for ergonomic state machine construction.
//!
//! [`MachineBuilder`] collects states, their superstates and their
//! handlers, then validates the whole hierarchy at once. [`Behavior`]
//! assembles handlers from entry/exit actions and per-signal reactions,
//! and [`state_enum!`](crate::state_enum) declares a state type.

pub mod behavior;
pub mod error;
pub mod machine;
pub mod macros;

pub use behavior::Behavior;
pub use error::BuildError;
pub use machine::{MachineBuilder, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_DEPTH};
