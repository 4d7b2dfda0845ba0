//! Transition history tracking.
//!
//! Every completed transition is summarised as a [`TransitionRecord`]
//! holding its topological case and least common ancestor. The record
//! also keeps the exact exit and entry sequence the engine executed.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Topological relationship between a transition's source and target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Source and target are the same state.
    SelfTransition,
    /// Source is the direct parent of the target.
    ParentToChild,
    /// Source and target share their direct parent.
    Sibling,
    /// Target is the direct parent of the source.
    ChildToParent,
    /// Source is a deeper ancestor of the target.
    AncestorToDescendant,
    /// Source's parent lies on the target's ancestor chain.
    SourceParentOnTargetPath,
    /// Anything else: both sides walk up to the common ancestor.
    General,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SelfTransition => "self",
            Self::ParentToChild => "parent-to-child",
            Self::Sibling => "sibling",
            Self::ChildToParent => "child-to-parent",
            Self::AncestorToDescendant => "ancestor-to-descendant",
            Self::SourceParentOnTargetPath => "source-parent-on-target-path",
            Self::General => "general",
        };
        f.write_str(label)
    }
}

/// Record of a single completed transition.
///
/// `exited` and `entered` list states in the order their handlers ran,
/// including exits below the source (when an ancestor handled the event)
/// and entries made by nested `Init` descent after landing on the target.
/// `lca` is `None` when the least common ancestor is the top state.
///
/// # Example
///
/// ```rust
/// use mindset_hsm::core::{State, TransitionKind, TransitionRecord};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Light { Red, Green }
///
/// impl State for Light {
///     fn name(&self) -> &str {
///         match self {
///             Self::Red => "Red",
///             Self::Green => "Green",
///         }
///     }
/// }
///
/// let record = TransitionRecord {
///     source: Light::Red,
///     target: Light::Green,
///     lca: None,
///     kind: TransitionKind::Sibling,
///     exited: vec![Light::Red],
///     entered: vec![Light::Green],
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.kind.to_string(), "sibling");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// State whose handler requested the transition
    pub source: S,
    /// Requested target state
    pub target: S,
    /// Least common ancestor, never exited or entered
    pub lca: Option<S>,
    /// Which of the seven cases resolved the transition
    pub kind: TransitionKind,
    /// States exited, innermost first
    pub exited: Vec<S>,
    /// States entered, outermost first
    pub entered: Vec<S>,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

impl<S: State> TransitionRecord<S> {
    /// State that was active once the transition and its Init descent finished.
    pub fn landed(&self) -> &S {
        self.entered.last().unwrap_or(&self.target)
    }
}

/// Ordered history of completed transitions.
///
/// `record` is pure and returns a new history; the engine itself keeps a
/// bounded window of the most recent records.
///
/// # Example
///
/// ```rust
/// use mindset_hsm::core::{State, StateHistory, TransitionKind, TransitionRecord};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Step { A, B, C }
///
/// impl State for Step {
///     fn name(&self) -> &str {
///         match self {
///             Self::A => "A",
///             Self::B => "B",
///             Self::C => "C",
///         }
///     }
/// }
///
/// let sibling = |from: Step, to: Step| TransitionRecord {
///     source: from.clone(),
///     target: to.clone(),
///     lca: None,
///     kind: TransitionKind::Sibling,
///     exited: vec![from],
///     entered: vec![to],
///     timestamp: Utc::now(),
/// };
///
/// let history = StateHistory::new()
///     .record(sibling(Step::A, Step::B))
///     .record(sibling(Step::B, Step::C));
///
/// assert_eq!(history.get_path(), vec![&Step::A, &Step::B, &Step::C]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    records: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// This does not mutate the existing history and applies no limit. It is
    /// for building histories by hand (tests, tooling); a running machine
    /// appends its own records.
    pub fn record(&self, record: TransitionRecord<S>) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Append in place, dropping the oldest records beyond `limit`.
    /// A limit of zero keeps nothing.
    pub(crate) fn push_bounded(&mut self, record: TransitionRecord<S>, limit: usize) {
        if limit == 0 {
            return;
        }
        self.records.push(record);
        self.truncate_oldest(limit);
    }

    /// Keep only the `limit` most recent records.
    pub(crate) fn truncate_oldest(&mut self, limit: usize) {
        if self.records.len() > limit {
            let excess = self.records.len() - limit;
            self.records.drain(..excess);
        }
    }

    /// Get the path of leaf states traversed.
    ///
    /// Returns the first record's source, then the state each transition
    /// landed in.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.source);
        }
        for record in &self.records {
            path.push(record.landed());
        }
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no records.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all records, oldest first.
    pub fn records(&self) -> &[TransitionRecord<S>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Parent,
        Left,
        Right,
        LeftChild,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Parent => "Parent",
                Self::Left => "Left",
                Self::Right => "Right",
                Self::LeftChild => "LeftChild",
            }
        }
    }

    fn sibling(from: TestState, to: TestState) -> TransitionRecord<TestState> {
        TransitionRecord {
            source: from.clone(),
            target: to.clone(),
            lca: Some(TestState::Parent),
            kind: TransitionKind::Sibling,
            exited: vec![from],
            entered: vec![to],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(sibling(TestState::Left, TestState::Right));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn path_follows_landed_states() {
        let descend = TransitionRecord {
            source: TestState::Right,
            target: TestState::Left,
            lca: Some(TestState::Parent),
            kind: TransitionKind::Sibling,
            exited: vec![TestState::Right],
            entered: vec![TestState::Left, TestState::LeftChild],
            timestamp: Utc::now(),
        };

        let history = StateHistory::new()
            .record(sibling(TestState::Left, TestState::Right))
            .record(descend);

        assert_eq!(
            history.get_path(),
            vec![&TestState::Left, &TestState::Right, &TestState::LeftChild]
        );
    }

    #[test]
    fn landed_falls_back_to_target_without_entries() {
        let record = TransitionRecord {
            source: TestState::LeftChild,
            target: TestState::Left,
            lca: Some(TestState::Left),
            kind: TransitionKind::ChildToParent,
            exited: vec![TestState::LeftChild],
            entered: vec![],
            timestamp: Utc::now(),
        };
        assert_eq!(record.landed(), &TestState::Left);
    }

    #[test]
    fn push_bounded_keeps_most_recent() {
        let mut history = StateHistory::new();
        history.push_bounded(sibling(TestState::Left, TestState::Right), 2);
        history.push_bounded(sibling(TestState::Right, TestState::Left), 2);
        history.push_bounded(sibling(TestState::Left, TestState::Right), 2);

        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].source, TestState::Right);
    }

    #[test]
    fn push_bounded_with_zero_limit_records_nothing() {
        let mut history = StateHistory::new();
        history.push_bounded(sibling(TestState::Left, TestState::Right), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn single_record_has_duration_zero() {
        let history = StateHistory::new().record(sibling(TestState::Left, TestState::Right));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(sibling(TestState::Left, TestState::Right));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState> = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.records()[0].kind, TransitionKind::Sibling);
        assert_eq!(deserialized.records()[0].lca, Some(TestState::Parent));
    }

    #[test]
    fn kind_display_is_kebab_case() {
        assert_eq!(TransitionKind::SelfTransition.to_string(), "self");
        assert_eq!(
            TransitionKind::SourceParentOnTargetPath.to_string(),
            "source-parent-on-target-path"
        );
    }
}
