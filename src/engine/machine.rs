//! The state machine instance and its read-only queries.

use super::error::HsmError;
use super::registry::{Registry, UnhandledHook};
use crate::checkpoint::Checkpoint;
use crate::core::{MachineId, State, StateHistory, StateRef};
use crate::hierarchy::StateIdx;
use tracing::{debug, warn};

/// Where a machine is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Built but not started: parked at the top state.
    Parked,
    /// `init` (or `restore`) completed; events may be dispatched.
    Running,
    /// An operation failed partway; the instance must be discarded.
    Faulted,
}

/// Outcome of a successful `dispatch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler consumed the event.
    Handled,
    /// A handler consumed the event and a transition completed.
    Transitioned,
    /// No state handled the event; the fallback hook ran.
    Unhandled,
    /// The event carried the Empty signal and was dropped.
    Ignored,
}

/// Hierarchical state machine.
///
/// Built with [`MachineBuilder`](crate::builder::MachineBuilder). Owns the
/// application context `C` that handlers mutate, the handler registry and
/// the active leaf. Handlers never see the machine itself, so a handler
/// cannot re-enter `dispatch` while one is in progress.
pub struct StateMachine<S: State, C> {
    pub(super) id: MachineId,
    pub(super) registry: Registry<S, C>,
    pub(super) context: C,
    pub(super) initial: StateIdx,
    pub(super) current: StateIdx,
    // State whose handler is looking at the event in flight.
    pub(super) source: Option<StateIdx>,
    pub(super) lifecycle: Lifecycle,
    pub(super) on_unhandled: Option<UnhandledHook<C>>,
    pub(super) max_depth: usize,
    pub(super) history: StateHistory<S>,
    pub(super) history_limit: usize,
}

impl<S: State, C> StateMachine<S, C> {
    pub(crate) fn from_parts(
        registry: Registry<S, C>,
        context: C,
        initial: StateIdx,
        on_unhandled: Option<UnhandledHook<C>>,
        max_depth: usize,
        history_limit: usize,
    ) -> Self {
        Self {
            id: MachineId::new(),
            registry,
            context,
            initial,
            current: StateIdx::TOP,
            source: None,
            lifecycle: Lifecycle::Parked,
            on_unhandled,
            max_depth,
            history: StateHistory::new(),
            history_limit,
        }
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The active leaf, or `None` while the machine is parked at the top state.
    pub fn current_state(&self) -> Option<&S> {
        self.registry.hierarchy().state(self.current)
    }

    /// Reference to the active leaf (the top state while parked).
    pub fn current_ref(&self) -> StateRef {
        StateRef::new(self.id, self.name_of(self.current))
    }

    /// Reference to a registered state of this machine.
    pub fn state_ref(&self, state: &S) -> Result<StateRef, HsmError> {
        let idx = self.lookup(state)?;
        Ok(StateRef::new(self.id, self.name_of(idx)))
    }

    /// Declared superstate of `state`. Top-level states answer the top
    /// state; the top state itself answers `None`.
    pub fn superstate(&self, state: &StateRef) -> Result<Option<StateRef>, HsmError> {
        let idx = self
            .registry
            .hierarchy()
            .lookup(state.name())
            .filter(|_| state.machine() == self.id)
            .ok_or_else(|| HsmError::MissingHandler {
                state: state.name().to_string(),
            })?;
        Ok(self
            .registry
            .hierarchy()
            .parent(idx)
            .map(|parent| StateRef::new(self.id, self.name_of(parent))))
    }

    /// Whether `state` is the active leaf or one of its ancestors.
    pub fn is_in(&self, state: &S) -> bool {
        let hierarchy = self.registry.hierarchy();
        hierarchy
            .lineage(self.current)
            .any(|idx| hierarchy.state(idx) == Some(state))
    }

    /// Every active state, outermost first, ending with the leaf.
    pub fn active_configuration(&self) -> Vec<&S> {
        let hierarchy = self.registry.hierarchy();
        let mut active: Vec<&S> = hierarchy
            .lineage(self.current)
            .filter_map(|idx| hierarchy.state(idx))
            .collect();
        active.reverse();
        active
    }

    /// Nesting depth of the active leaf; 0 while parked.
    pub fn depth(&self) -> usize {
        self.registry.hierarchy().depth(self.current)
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Most recent completed transitions, oldest first.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Snapshot of the active leaf and history.
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint::new(self.id, self.current_state().cloned(), self.history.clone())
    }

    /// Resume from a checkpoint taken by an earlier machine with the same states.
    ///
    /// Only valid on a parked machine. The leaf becomes active directly:
    /// no Entry or Init handlers run, because they already ran in the
    /// machine that produced the checkpoint. Restored history is cut to
    /// this machine's history limit, keeping the newest records.
    pub fn restore(&mut self, checkpoint: Checkpoint<S>) -> Result<(), HsmError> {
        match self.lifecycle {
            Lifecycle::Parked => {}
            Lifecycle::Running => return Err(HsmError::AlreadyInitialized),
            Lifecycle::Faulted => return Err(HsmError::Faulted),
        }
        checkpoint.validate()?;

        if let Some(state) = &checkpoint.current_state {
            let idx = self.lookup(state)?;
            if idx.is_top() {
                return Err(HsmError::MissingHandler {
                    state: state.name().to_string(),
                });
            }
            self.current = idx;
            self.lifecycle = Lifecycle::Running;
        }
        self.history = checkpoint.history;
        self.history.truncate_oldest(self.history_limit);

        debug!(
            machine = %self.id,
            checkpoint = %checkpoint.id,
            leaf = self.name_of(self.current),
            "restored from checkpoint"
        );
        Ok(())
    }

    pub(super) fn lookup(&self, state: &S) -> Result<StateIdx, HsmError> {
        self.registry
            .hierarchy()
            .lookup(state.name())
            .ok_or_else(|| HsmError::MissingHandler {
                state: state.name().to_string(),
            })
    }

    pub(super) fn name_of(&self, idx: StateIdx) -> &str {
        self.registry.hierarchy().name(idx)
    }

    pub(super) fn ensure_running(&self) -> Result<(), HsmError> {
        match self.lifecycle {
            Lifecycle::Running => Ok(()),
            Lifecycle::Parked => Err(HsmError::NotInitialized),
            Lifecycle::Faulted => Err(HsmError::Faulted),
        }
    }

    /// Run an engine operation; any failure faults the machine.
    pub(super) fn run_guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, HsmError>,
    ) -> Result<T, HsmError> {
        let result = op(self);
        if let Err(error) = &result {
            self.lifecycle = Lifecycle::Faulted;
            warn!(
                machine = %self.id,
                leaf = self.name_of(self.current),
                %error,
                "state machine faulted"
            );
        }
        result
    }
}

impl<S: State, C> std::fmt::Debug for StateMachine<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("current", &self.name_of(self.current))
            .field("lifecycle", &self.lifecycle)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}
