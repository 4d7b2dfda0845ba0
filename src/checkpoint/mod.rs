//! Checkpoint and resume functionality for state machines.
//!
//! A checkpoint captures the active leaf and the transition history so a
//! long-lived machine can be rebuilt after a process restart. Handlers and
//! the application context are not part of it: the resuming process builds
//! the same machine again and calls
//! [`StateMachine::restore`](crate::engine::StateMachine::restore).
//!
//! Where the bytes are stored is up to the application.

use crate::core::{MachineId, State, StateHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a running machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// Machine the snapshot was taken from
    pub machine: MachineId,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Active leaf, `None` if the machine had not been started
    pub current_state: Option<S>,

    /// Recorded transitions
    pub history: StateHistory<S>,
}

impl<S: State> Checkpoint<S> {
    pub(crate) fn new(
        machine: MachineId,
        current_state: Option<S>,
        history: StateHistory<S>,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            machine,
            timestamp: Utc::now(),
            current_state,
            history,
        }
    }

    /// Reject checkpoints written by another format version.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}
