//! Machine identity and state references.

use super::state::TOP_STATE_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one machine instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineId(Uuid);

impl MachineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lightweight handle naming a state within a machine instance.
///
/// Two references are equal iff they name the same state of the same
/// machine. A reference carries no tree structure; ask the machine for
/// superstates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateRef {
    machine: MachineId,
    name: String,
}

impl StateRef {
    pub fn new(machine: MachineId, name: impl Into<String>) -> Self {
        Self {
            machine,
            name: name.into(),
        }
    }

    /// Reference to the top state of `machine`.
    pub fn top(machine: MachineId) -> Self {
        Self::new(machine, TOP_STATE_NAME)
    }

    pub fn machine(&self) -> MachineId {
        self.machine
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_top(&self) -> bool {
        self.name == TOP_STATE_NAME
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_compare_by_machine_and_name() {
        let m1 = MachineId::new();
        let m2 = MachineId::new();

        assert_eq!(StateRef::new(m1, "A"), StateRef::new(m1, "A"));
        assert_ne!(StateRef::new(m1, "A"), StateRef::new(m1, "B"));
        assert_ne!(StateRef::new(m1, "A"), StateRef::new(m2, "A"));
    }

    #[test]
    fn top_reference_is_recognised() {
        let machine = MachineId::new();
        let top = StateRef::top(machine);

        assert!(top.is_top());
        assert_eq!(top.name(), "TOP");
        assert!(!StateRef::new(machine, "A").is_top());
    }

    #[test]
    fn machine_ids_are_unique() {
        assert_ne!(MachineId::new(), MachineId::new());
    }

    #[test]
    fn display_includes_machine() {
        let machine = MachineId::new();
        let reference = StateRef::new(machine, "Idle");
        assert_eq!(reference.to_string(), format!("Idle@{machine}"));
    }
}
