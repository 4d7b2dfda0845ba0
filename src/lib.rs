//! Mindset HSM: hierarchical state machines in the UML statechart style.
//!
//! States nest inside superstates. An event goes to the innermost active
//! state first and bubbles outward until some state handles it. A state
//! can answer an event with a transition. The engine then exits states up
//! to the least common ancestor of source and target. It enters states
//! down to the target, then follows `Init` answers until it reaches a leaf.
//!
//! The crate keeps a "pure core, imperative shell" split:
//!
//! - **core**: value types (states, events, responses, history)
//! - **builder**: declares states, superstates and handlers, and validates
//!   the hierarchy in one pass
//! - **engine**: the running machine that owns the application context
//! - **checkpoint**: serializable snapshots for resuming after a restart
//!
//! Logging goes through [`tracing`]; install a subscriber to see it.
//!
//! # Example
//!
//! ```rust
//! use mindset_hsm::{Behavior, Event, MachineBuilder, Response, Signal};
//! use mindset_hsm::state_enum;
//!
//! state_enum! {
//!     enum Washer {
//!         Running,
//!         Filling,
//!         Spinning,
//!         Paused,
//!     }
//! }
//!
//! let mut washer = MachineBuilder::new()
//!     .state(
//!         Washer::Running,
//!         Behavior::new()
//!             .initial(Washer::Filling)
//!             .exit(|log: &mut Vec<String>| log.push("exit Running".into()))
//!             .transition_on("pause", Washer::Paused)
//!             .into_handler(),
//!     )
//!     .substate(Washer::Filling, Washer::Running, |log: &mut Vec<String>, event: &Event| {
//!         match event.signal() {
//!             Signal::Entry => {
//!                 log.push("enter Filling".into());
//!                 Response::Handled
//!             }
//!             Signal::Exit => {
//!                 log.push("exit Filling".into());
//!                 Response::Handled
//!             }
//!             _ if event.is("full") => Response::Transition(Washer::Spinning),
//!             _ => Response::Bubble,
//!         }
//!     })
//!     .substate(
//!         Washer::Spinning,
//!         Washer::Running,
//!         Behavior::new()
//!             .entry(|log: &mut Vec<String>| log.push("enter Spinning".into()))
//!             .into_handler(),
//!     )
//!     .state(
//!         Washer::Paused,
//!         Behavior::new()
//!             .entry(|log: &mut Vec<String>| log.push("enter Paused".into()))
//!             .transition_on("resume", Washer::Running)
//!             .into_handler(),
//!     )
//!     .initial(Washer::Running)
//!     .build(Vec::new())
//!     .unwrap();
//!
//! washer.init(None).unwrap();
//! washer.dispatch("full").unwrap();
//! washer.dispatch("pause").unwrap();
//!
//! assert_eq!(washer.current_state(), Some(&Washer::Paused));
//! assert_eq!(
//!     washer.context(),
//!     &vec![
//!         "enter Filling",
//!         "exit Filling",
//!         "enter Spinning",
//!         "exit Running",
//!         "enter Paused",
//!     ]
//! );
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;
mod hierarchy;

// Re-export commonly used types
pub use builder::{Behavior, BuildError, MachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{
    Event, MachineId, Response, Signal, State, StateHistory, StateRef, TransitionKind,
    TransitionRecord,
};
pub use engine::{Dispatch, HsmError, Lifecycle, StateMachine, TopologyError};
pub use hierarchy::HierarchyError;
