//! Handler registry: one handler per arena slot.

use super::error::HsmError;
use crate::core::{Event, Response, State};
use crate::hierarchy::{Hierarchy, StateIdx};

/// State handler. Receives the application context and the event, and
/// answers with a [`Response`].
pub type Handler<S, C> = Box<dyn Fn(&mut C, &Event) -> Response<S> + Send + Sync>;

/// Called once for every dispatched event that no state handled.
pub type UnhandledHook<C> = Box<dyn Fn(&mut C, &Event) + Send + Sync>;

pub(crate) struct Registry<S, C> {
    hierarchy: Hierarchy<S>,
    // Indexed like the arena; slot 0 (the top state) is always empty.
    handlers: Vec<Option<Handler<S, C>>>,
}

impl<S: State, C> Registry<S, C> {
    pub(crate) fn new(hierarchy: Hierarchy<S>, handlers: Vec<Option<Handler<S, C>>>) -> Self {
        Self {
            hierarchy,
            handlers,
        }
    }

    pub(crate) fn hierarchy(&self) -> &Hierarchy<S> {
        &self.hierarchy
    }

    pub(crate) fn invoke(
        &self,
        state: StateIdx,
        context: &mut C,
        event: &Event,
    ) -> Result<Response<S>, HsmError> {
        let handler = self
            .handlers
            .get(state.as_usize())
            .and_then(Option::as_ref)
            .ok_or_else(|| HsmError::MissingHandler {
                state: self.hierarchy.name(state).to_string(),
            })?;
        Ok(handler(context, event))
    }
}
