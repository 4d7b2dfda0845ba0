//! The hierarchical state machine engine.
//!
//! This module is the imperative shell around the core types: it owns the
//! active leaf and runs handlers in the order UML statecharts require.
//!
//! # Key Concepts
//!
//! - **Dispatcher**: bubbles an event from the leaf toward the top state
//! - **Transition engine**: exits up to the least common ancestor of source
//!   and target, then enters down to the target
//! - **Initializer**: follows `Init` answers from a composite state to a leaf
//!
//! # Failure model
//!
//! There is no rollback. If a handler misbehaves halfway through an
//! exit/entry sequence the machine is left partially transitioned. It then
//! marks itself [`Lifecycle::Faulted`] and refuses further work.

mod dispatch;
mod error;
mod init;
mod machine;
mod registry;
mod transition;

pub use error::{HsmError, TopologyError};
pub use machine::{Dispatch, Lifecycle, StateMachine};
pub(crate) use registry::Registry;
pub use registry::{Handler, UnhandledHook};
