//! Event bubbling from the active leaf toward the top state.

use super::error::HsmError;
use super::machine::{Dispatch, StateMachine};
use crate::core::{Event, Response, Signal, State};
use crate::hierarchy::StateIdx;
use tracing::{debug, trace, warn};

impl<S: State, C> StateMachine<S, C> {
    /// Feed one event to the machine.
    ///
    /// The active leaf's handler sees the event first; each `Bubble` moves
    /// it one level up, so every ancestor is asked at most once and in
    /// order. If it reaches the top state unhandled, the fallback hook runs
    /// once and the active leaf is left unchanged.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before `init`, `Faulted` after an earlier failure,
    /// `ReservedSignal` for Entry/Exit/Init. Handler defects surface as
    /// `MissingHandler`, `InvalidTransition` or `InvalidResponse` and fault
    /// the machine.
    pub fn dispatch(&mut self, event: impl Into<Event>) -> Result<Dispatch, HsmError> {
        let event = event.into();
        self.ensure_running()?;

        match event.signal() {
            Signal::Empty => {
                trace!(machine = %self.id, "empty event ignored");
                return Ok(Dispatch::Ignored);
            }
            Signal::Entry | Signal::Exit | Signal::Init => {
                warn!(machine = %self.id, signal = %event.signal(), "control signal dispatched");
                return Err(HsmError::ReservedSignal(event.signal().to_string()));
            }
            Signal::User(_) => {}
        }

        let outcome = self.run_guarded(|machine| machine.bubble(&event));
        self.source = None;

        if let Ok(outcome) = &outcome {
            debug!(
                machine = %self.id,
                event = %event,
                ?outcome,
                leaf = self.name_of(self.current),
                "event dispatched"
            );
        }
        outcome
    }

    fn bubble(&mut self, event: &Event) -> Result<Dispatch, HsmError> {
        let mut state = self.current;
        let mut hops = 0;

        loop {
            if state.is_top() {
                if let Some(hook) = &self.on_unhandled {
                    hook(&mut self.context, event);
                }
                return Ok(Dispatch::Unhandled);
            }

            // Unreachable on a validated hierarchy; kept as a backstop.
            hops += 1;
            if hops > self.max_depth {
                return Err(HsmError::NonTerminatingHierarchy {
                    state: self.name_of(self.current).to_string(),
                    limit: self.max_depth,
                });
            }

            self.source = Some(state);
            match self.registry.invoke(state, &mut self.context, event)? {
                Response::Handled => return Ok(Dispatch::Handled),
                Response::Bubble => {
                    // Only the top state lacks a parent, and it was handled above.
                    state = self
                        .registry
                        .hierarchy()
                        .parent(state)
                        .unwrap_or(StateIdx::TOP);
                }
                Response::Transition(target) => {
                    let target = self.lookup(&target)?;
                    self.transition(target)?;
                    return Ok(Dispatch::Transitioned);
                }
                response @ Response::Initial(_) => {
                    return Err(self.invalid_response(state, event, &response));
                }
            }
        }
    }
}
