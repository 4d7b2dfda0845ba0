//! Declarative handler construction.
//!
//! Most states react to a handful of named signals and otherwise defer to
//! their superstate. `Behavior` builds that handler from small pieces so
//! callers do not have to write the `match` on `Signal` by hand.

use crate::core::{Event, Response, Signal, State};

type Action<C> = Box<dyn Fn(&mut C) + Send + Sync>;
type Reaction<S, C> = Box<dyn Fn(&mut C, &Event) -> Response<S> + Send + Sync>;

/// Fluent description of one state's handler.
///
/// Entry and exit actions run and report `Handled`. `Init` answers with the
/// configured initial substate, if any. User signals without a reaction,
/// and Empty, bubble to the superstate.
pub struct Behavior<S, C> {
    entry: Option<Action<C>>,
    exit: Option<Action<C>>,
    initial: Option<S>,
    reactions: Vec<(String, Reaction<S, C>)>,
}

impl<S: State + 'static, C: 'static> Behavior<S, C> {
    pub fn new() -> Self {
        Self {
            entry: None,
            exit: None,
            initial: None,
            reactions: Vec::new(),
        }
    }

    pub fn entry<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.entry = Some(Box::new(action));
        self
    }

    pub fn exit<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.exit = Some(Box::new(action));
        self
    }

    /// Substate to drill into when this state is the transition target.
    pub fn initial(mut self, child: S) -> Self {
        self.initial = Some(child);
        self
    }

    /// React to a user signal. The first reaction registered for a signal wins.
    pub fn on<F>(mut self, signal: impl Into<String>, reaction: F) -> Self
    where
        F: Fn(&mut C, &Event) -> Response<S> + Send + Sync + 'static,
    {
        self.reactions.push((signal.into(), Box::new(reaction)));
        self
    }

    /// Shorthand for a reaction that always transitions to `target`.
    pub fn transition_on(self, signal: impl Into<String>, target: S) -> Self {
        self.on(signal, move |_: &mut C, _: &Event| {
            Response::Transition(target.clone())
        })
    }

    /// Finish into a handler accepted by
    /// [`MachineBuilder::state`](crate::builder::MachineBuilder::state).
    pub fn into_handler(self) -> impl Fn(&mut C, &Event) -> Response<S> + Send + Sync + 'static {
        move |context: &mut C, event: &Event| match event.signal() {
            Signal::Entry => {
                if let Some(action) = &self.entry {
                    action(context);
                }
                Response::Handled
            }
            Signal::Exit => {
                if let Some(action) = &self.exit {
                    action(context);
                }
                Response::Handled
            }
            Signal::Init => self
                .initial
                .clone()
                .map_or(Response::Handled, Response::Initial),
            Signal::Empty => Response::Bubble,
            Signal::User(name) => self
                .reactions
                .iter()
                .find(|(signal, _)| signal == name)
                .map_or(Response::Bubble, |(_, reaction)| reaction(context, event)),
        }
    }
}

impl<S: State + 'static, C: 'static> Default for Behavior<S, C> {
    fn default() -> Self {
        Self::new()
    }
}
