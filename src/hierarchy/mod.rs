//! Arena of state records with integer-indexed parent links.
//!
//! Superstates are declared once when the machine is built and never
//! re-queried from handlers. Index 0 is always the top state.

mod error;
mod validate;

pub use error::HierarchyError;
pub(crate) use validate::{check_initial, check_name, check_parent, check_termination, collect};

use crate::core::{State, TOP_STATE_NAME};
use std::collections::HashMap;

/// Position of a state record in a [`Hierarchy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct StateIdx(usize);

impl StateIdx {
    pub(crate) const TOP: StateIdx = StateIdx(0);

    pub(crate) fn is_top(self) -> bool {
        self == Self::TOP
    }

    pub(crate) fn as_usize(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<S> {
    state: Option<S>,
    name: String,
    parent: Option<StateIdx>,
}

#[derive(Debug)]
pub(crate) struct Hierarchy<S> {
    nodes: Vec<Node<S>>,
    index: HashMap<String, StateIdx>,
}

impl<S: State> Hierarchy<S> {
    pub(crate) fn new() -> Self {
        let top = Node {
            state: None,
            name: TOP_STATE_NAME.to_string(),
            parent: None,
        };
        let mut index = HashMap::new();
        index.insert(TOP_STATE_NAME.to_string(), StateIdx::TOP);
        Self {
            nodes: vec![top],
            index,
        }
    }

    /// Add a state directly under the top state.
    pub(crate) fn insert(&mut self, state: S) -> StateIdx {
        let idx = StateIdx(self.nodes.len());
        let name = state.name().to_string();
        self.index.insert(name.clone(), idx);
        self.nodes.push(Node {
            state: Some(state),
            name,
            parent: Some(StateIdx::TOP),
        });
        idx
    }

    pub(crate) fn set_parent(&mut self, idx: StateIdx, parent: StateIdx) {
        self.nodes[idx.0].parent = Some(parent);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<StateIdx> {
        self.index.get(name).copied()
    }

    /// Declared superstate; `None` only for the top state.
    pub(crate) fn parent(&self, idx: StateIdx) -> Option<StateIdx> {
        self.nodes[idx.0].parent
    }

    /// The application value, `None` for the top state.
    pub(crate) fn state(&self, idx: StateIdx) -> Option<&S> {
        self.nodes[idx.0].state.as_ref()
    }

    pub(crate) fn name(&self, idx: StateIdx) -> &str {
        &self.nodes[idx.0].name
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn indices(&self) -> impl Iterator<Item = StateIdx> {
        (0..self.nodes.len()).map(StateIdx)
    }

    /// Walk from `idx` outward: `idx` itself, its parent, ..., the top state.
    ///
    /// Only call on a validated hierarchy; a parent cycle never ends.
    pub(crate) fn lineage(&self, idx: StateIdx) -> Lineage<'_, S> {
        Lineage {
            hierarchy: self,
            next: Some(idx),
        }
    }

    /// Number of hops from `idx` up to the top state.
    pub(crate) fn depth(&self, idx: StateIdx) -> usize {
        self.lineage(idx).count() - 1
    }
}

pub(crate) struct Lineage<'a, S> {
    hierarchy: &'a Hierarchy<S>,
    next: Option<StateIdx>,
}

impl<S> Iterator for Lineage<'_, S> {
    type Item = StateIdx;

    fn next(&mut self) -> Option<StateIdx> {
        let current = self.next?;
        self.next = self.hierarchy.nodes[current.0].parent;
        Some(current)
    }
}
