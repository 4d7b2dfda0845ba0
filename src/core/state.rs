//! Core State trait for hierarchical state machine states.
//!
//! Application states are plain values (usually enums). Their place in the
//! hierarchy is declared when the machine is built, not on the type itself,
//! so the trait only has to provide a stable name.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Name reserved for the implicit root of every hierarchy.
pub const TOP_STATE_NAME: &str = "TOP";

/// Trait for state machine states.
///
/// A state's identity inside a machine is its [`name`](State::name): two
/// values with the same name refer to the same state. The name `"TOP"` is
/// reserved and rejected when the machine is built.
///
/// # Required Traits
///
/// - `Clone`: States are copied into transition records and checkpoints
/// - `PartialEq`: States must be comparable for queries such as `is_in`
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for checkpoints
///
/// # Example
///
/// ```rust
/// use mindset_hsm::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Closed,
///     Locked,
///     Open,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Locked => "Locked",
///             Self::Open => "Open",
///         }
///     }
/// }
///
/// assert_eq!(Door::Locked.name(), "Locked");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name.
    ///
    /// Must be stable for the lifetime of the value and unique among the
    /// states registered with one machine.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Idle,
        Active,
        Active1,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Active => "Active",
                Self::Active1 => "Active1",
            }
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Active.name(), "Active");
        assert_eq!(TestState::Active1.name(), "Active1");
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Active1;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }

    #[test]
    fn reserved_name_is_top() {
        assert_eq!(TOP_STATE_NAME, "TOP");
        assert_ne!(TestState::Idle.name(), TOP_STATE_NAME);
    }
}
