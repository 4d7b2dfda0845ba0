//! Core hierarchical state machine types.
//!
//! This module contains the value types shared by the engine and its
//! collaborators:
//! - State definitions via the `State` trait
//! - Events, control signals and handler responses
//! - Machine identity and state references
//! - Transition history records
//!
//! Nothing in this module touches a running machine.

mod event;
mod history;
mod reference;
mod response;
mod state;

pub use event::{Event, Signal};
pub use history::{StateHistory, TransitionKind, TransitionRecord};
pub use reference::{MachineId, StateRef};
pub use response::Response;
pub use state::{State, TOP_STATE_NAME};
