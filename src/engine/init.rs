//! Initializer: startup and nested Init descent.

use super::error::{HsmError, TopologyError};
use super::machine::{Lifecycle, StateMachine};
use crate::core::{Event, Response, State};
use crate::hierarchy::StateIdx;
use serde_json::Value;
use tracing::{debug, trace};

impl<S: State, C> StateMachine<S, C> {
    /// Run the one-time startup sequence.
    ///
    /// Enters every ancestor of the initial state outermost first, then the
    /// initial state itself, then follows `Init` answers down to a leaf.
    /// `payload` is attached to every `Init` event sent during startup.
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` on a second call, `Faulted` after an earlier
    /// failure. Handler defects fault the machine.
    pub fn init(&mut self, payload: Option<Value>) -> Result<(), HsmError> {
        match self.lifecycle {
            Lifecycle::Parked => {}
            Lifecycle::Running => return Err(HsmError::AlreadyInitialized),
            Lifecycle::Faulted => return Err(HsmError::Faulted),
        }
        self.run_guarded(|machine| machine.start(payload))
    }

    fn start(&mut self, payload: Option<Value>) -> Result<(), HsmError> {
        let mut path: Vec<StateIdx> = self
            .registry
            .hierarchy()
            .lineage(self.initial)
            .take_while(|idx| !idx.is_top())
            .collect();
        path.reverse();

        let mut entered = Vec::new();
        for state in path {
            self.enter(state, &mut entered)?;
            self.current = state;
        }
        self.drill(&Event::init_with(payload), &mut entered)?;
        self.lifecycle = Lifecycle::Running;

        debug!(
            machine = %self.id,
            leaf = self.name_of(self.current),
            entered = entered.len(),
            "machine started"
        );
        Ok(())
    }

    /// Ask the active state for an initial substate and enter it. Repeat
    /// until a state answers without one.
    ///
    /// Each step must go exactly one level deeper, so the loop is bounded
    /// by the hierarchy depth.
    pub(super) fn drill(&mut self, init: &Event, entered: &mut Vec<S>) -> Result<(), HsmError> {
        let mut steps = 0;
        loop {
            let state = self.current;
            trace!(machine = %self.id, state = self.name_of(state), "init");
            match self.registry.invoke(state, &mut self.context, init)? {
                Response::Handled | Response::Bubble => return Ok(()),
                Response::Initial(child) => {
                    let child = self.lookup(&child)?;
                    if self.superstate_of(child) != Some(state) {
                        return Err(TopologyError::InitNotChild {
                            state: self.name_of(state).to_string(),
                            child: self.name_of(child).to_string(),
                        }
                        .into());
                    }
                    // Unreachable once the direct-child check passes; kept as a backstop.
                    steps += 1;
                    if steps > self.max_depth {
                        return Err(HsmError::NonTerminatingHierarchy {
                            state: self.name_of(child).to_string(),
                            limit: self.max_depth,
                        });
                    }
                    self.enter(child, entered)?;
                    self.current = child;
                }
                response @ Response::Transition(_) => {
                    return Err(self.invalid_response(state, init, &response));
                }
            }
        }
    }
}
