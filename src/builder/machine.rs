//! Builder for constructing hierarchical state machines.

use crate::builder::error::BuildError;
use crate::core::{Event, Response, State};
use crate::engine::{Handler, Registry, StateMachine, UnhandledHook};
use crate::hierarchy::{
    check_initial, check_name, check_parent, check_termination, collect, Hierarchy,
};

/// Default bound on nesting depth and on `Init` descent steps.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of transition records a machine keeps.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

struct Definition<S, C> {
    state: S,
    parent: Option<S>,
    handler: Handler<S, C>,
}

/// Builder for constructing state machines with a fluent API.
///
/// The builder is the handler registry: each state is registered once
/// with its handler and (optionally) its parent. Structure is checked as a
/// whole in [`build`](MachineBuilder::build), which reports every problem
/// it finds rather than the first.
///
/// # Example
///
/// ```
/// use mindset_hsm::builder::{Behavior, MachineBuilder};
/// use mindset_hsm::state_enum;
///
/// state_enum! {
///     enum Oven {
///         Heating,
///         Baking,
///         Toasting,
///         DoorOpen,
///     }
/// }
///
/// let mut oven = MachineBuilder::new()
///     .state(
///         Oven::Heating,
///         Behavior::<Oven, ()>::new()
///             .initial(Oven::Baking)
///             .transition_on("open", Oven::DoorOpen)
///             .into_handler(),
///     )
///     .substate(
///         Oven::Baking,
///         Oven::Heating,
///         Behavior::<Oven, ()>::new()
///             .transition_on("toast", Oven::Toasting)
///             .into_handler(),
///     )
///     .substate(
///         Oven::Toasting,
///         Oven::Heating,
///         Behavior::<Oven, ()>::new().into_handler(),
///     )
///     .state(
///         Oven::DoorOpen,
///         Behavior::<Oven, ()>::new()
///             .transition_on("close", Oven::Heating)
///             .into_handler(),
///     )
///     .initial(Oven::Heating)
///     .build(())
///     .unwrap();
///
/// oven.init(None).unwrap();
/// assert_eq!(oven.current_state(), Some(&Oven::Baking));
///
/// oven.dispatch("open").unwrap();
/// assert_eq!(oven.current_state(), Some(&Oven::DoorOpen));
///
/// oven.dispatch("close").unwrap();
/// assert_eq!(oven.current_state(), Some(&Oven::Baking));
/// ```
pub struct MachineBuilder<S: State + 'static, C: 'static> {
    initial: Option<S>,
    definitions: Vec<Definition<S, C>>,
    on_unhandled: Option<UnhandledHook<C>>,
    max_depth: usize,
    history_limit: usize,
}

impl<S: State + 'static, C: 'static> MachineBuilder<S, C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            definitions: Vec::new(),
            on_unhandled: None,
            max_depth: DEFAULT_MAX_DEPTH,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Register a state directly under the top state.
    pub fn state<F>(mut self, state: S, handler: F) -> Self
    where
        F: Fn(&mut C, &Event) -> Response<S> + Send + Sync + 'static,
    {
        self.definitions.push(Definition {
            state,
            parent: None,
            handler: Box::new(handler),
        });
        self
    }

    /// Register a state nested in `parent`.
    pub fn substate<F>(mut self, state: S, parent: S, handler: F) -> Self
    where
        F: Fn(&mut C, &Event) -> Response<S> + Send + Sync + 'static,
    {
        self.definitions.push(Definition {
            state,
            parent: Some(parent),
            handler: Box::new(handler),
        });
        self
    }

    /// Set the state `init` starts in (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Called once for each dispatched event no state handles.
    pub fn on_unhandled<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C, &Event) + Send + Sync + 'static,
    {
        self.on_unhandled = Some(Box::new(hook));
        self
    }

    /// Bound nesting depth and `Init` descent steps.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Number of transition records to keep; 0 disables recording.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Validate the registry and build a machine parked at the top state.
    pub fn build(self, context: C) -> Result<StateMachine<S, C>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        if self.definitions.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut hierarchy = Hierarchy::new();
        let mut handlers: Vec<Option<Handler<S, C>>> = vec![None];
        let mut checks = Vec::new();
        let mut declared = Vec::new();

        for definition in self.definitions {
            let check = check_name(&hierarchy, definition.state.name());
            if check.is_failure() {
                checks.push(check);
                continue;
            }
            let parent = definition.parent.map(|p| p.name().to_string());
            let idx = hierarchy.insert(definition.state);
            handlers.push(Some(definition.handler));
            declared.push((idx, parent));
        }

        for (idx, parent) in declared {
            let Some(parent) = parent else { continue };
            checks.push(check_parent(&hierarchy, hierarchy.name(idx), &parent));
            if let Some(parent) = hierarchy.lookup(&parent) {
                hierarchy.set_parent(idx, parent);
            }
        }

        checks.extend(check_termination(&hierarchy, self.max_depth));
        checks.push(check_initial(&hierarchy, initial.name()));
        collect(checks).map_err(BuildError::InvalidHierarchy)?;

        let initial = hierarchy
            .lookup(initial.name())
            .ok_or(BuildError::MissingInitialState)?;

        Ok(StateMachine::from_parts(
            Registry::new(hierarchy, handlers),
            context,
            initial,
            self.on_unhandled,
            self.max_depth,
            self.history_limit,
        ))
    }
}

impl<S: State + 'static, C: 'static> Default for MachineBuilder<S, C> {
    fn default() -> Self {
        Self::new()
    }
}
