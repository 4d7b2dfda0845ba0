//! Structural checks run once when a machine is built.
//!
//! Each check yields a `Validation` so the builder can report every defect
//! in one pass instead of stopping at the first.

use super::error::HierarchyError;
use super::{Hierarchy, StateIdx};
use crate::core::{State, TOP_STATE_NAME};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

pub(crate) type Check = Validation<(), NonEmptyVec<HierarchyError>>;

/// The name must not be reserved or already registered.
pub(crate) fn check_name<S: State>(hierarchy: &Hierarchy<S>, name: &str) -> Check {
    if name == TOP_STATE_NAME {
        Validation::fail(HierarchyError::ReservedName(name.to_string()))
    } else if hierarchy.lookup(name).is_some() {
        Validation::fail(HierarchyError::DuplicateState(name.to_string()))
    } else {
        Validation::success(())
    }
}

/// A declared parent must itself be registered (or be the top state).
pub(crate) fn check_parent<S: State>(hierarchy: &Hierarchy<S>, state: &str, parent: &str) -> Check {
    if hierarchy.lookup(parent).is_some() {
        Validation::success(())
    } else {
        Validation::fail(HierarchyError::MissingParent {
            state: state.to_string(),
            parent: parent.to_string(),
        })
    }
}

pub(crate) fn check_initial<S: State>(hierarchy: &Hierarchy<S>, initial: &str) -> Check {
    match hierarchy.lookup(initial) {
        Some(idx) if !idx.is_top() => Validation::success(()),
        _ => Validation::fail(HierarchyError::MissingInitial(initial.to_string())),
    }
}

/// Every superstate chain must reach the top state, and no deeper than `max_depth`.
///
/// A chain longer than the number of registered states can only be a cycle.
pub(crate) fn check_termination<S: State>(hierarchy: &Hierarchy<S>, max_depth: usize) -> Vec<Check> {
    let limit = hierarchy.len();
    hierarchy
        .indices()
        .filter(|idx| !idx.is_top())
        .map(|idx| {
            let name = hierarchy.name(idx);
            match hops_to_top(hierarchy, idx, limit) {
                None => Validation::fail(HierarchyError::NonTerminating {
                    state: name.to_string(),
                    limit,
                }),
                Some(depth) if depth > max_depth => Validation::fail(HierarchyError::TooDeep {
                    state: name.to_string(),
                    depth,
                    limit: max_depth,
                }),
                Some(_) => Validation::success(()),
            }
        })
        .collect()
}

fn hops_to_top<S: State>(hierarchy: &Hierarchy<S>, start: StateIdx, limit: usize) -> Option<usize> {
    let mut cursor = start;
    let mut hops = 0;
    while !cursor.is_top() {
        if hops >= limit {
            return None;
        }
        cursor = hierarchy.parent(cursor)?;
        hops += 1;
    }
    Some(hops)
}

/// Accumulate ALL failures into one list.
pub(crate) fn collect(checks: Vec<Check>) -> Result<(), Vec<HierarchyError>> {
    match Validation::all_vec(checks).map(|_| ()) {
        Validation::Success(()) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Named(String);

    impl State for Named {
        fn name(&self) -> &str {
            &self.0
        }
    }

    fn named(name: &str) -> Named {
        Named(name.to_string())
    }

    #[test]
    fn reserved_and_duplicate_names_fail() {
        let mut h = Hierarchy::new();
        h.insert(named("A"));

        assert!(check_name(&h, "TOP").is_failure());
        assert!(check_name(&h, "A").is_failure());
        assert!(check_name(&h, "B").is_success());
    }

    #[test]
    fn unknown_parent_fails() {
        let mut h = Hierarchy::new();
        h.insert(named("A"));

        assert!(check_parent(&h, "A1", "A").is_success());
        assert!(check_parent(&h, "A1", "TOP").is_success());
        assert!(check_parent(&h, "A1", "Z").is_failure());
    }

    #[test]
    fn initial_must_be_a_registered_state() {
        let mut h = Hierarchy::new();
        h.insert(named("A"));

        assert!(check_initial(&h, "A").is_success());
        assert!(check_initial(&h, "TOP").is_failure());
        assert!(check_initial(&h, "B").is_failure());
    }

    #[test]
    fn cycle_is_non_terminating() {
        let mut h = Hierarchy::new();
        let a = h.insert(named("A"));
        let b = h.insert(named("B"));
        h.set_parent(a, b);
        h.set_parent(b, a);

        let result = collect(check_termination(&h, 64));
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, HierarchyError::NonTerminating { limit: 3, .. })));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut h = Hierarchy::new();
        let a = h.insert(named("A"));
        let b = h.insert(named("B"));
        let c = h.insert(named("C"));
        h.set_parent(b, a);
        h.set_parent(c, b);

        assert!(collect(check_termination(&h, 3)).is_ok());

        let errors = collect(check_termination(&h, 2)).unwrap_err();
        assert_eq!(
            errors,
            vec![HierarchyError::TooDeep {
                state: "C".to_string(),
                depth: 3,
                limit: 2,
            }]
        );
    }

    #[test]
    fn collect_accumulates_all_failures() {
        let h: Hierarchy<Named> = Hierarchy::new();
        let checks = vec![
            check_name(&h, "TOP"),
            check_parent(&h, "A", "Missing"),
            check_initial(&h, "Nowhere"),
        ];

        let errors = collect(checks).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|e| matches!(e, HierarchyError::ReservedName(_))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, HierarchyError::MissingParent { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, HierarchyError::MissingInitial(_))));
    }
}
