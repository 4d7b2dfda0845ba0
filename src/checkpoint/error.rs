//! Errors from encoding, decoding and checking checkpoints.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckpointError {
    /// The snapshot could not be written as JSON or bincode.
    #[error("Could not encode checkpoint: {0}")]
    SerializationFailed(String),

    /// The bytes are not a checkpoint for this state type.
    #[error("Could not decode checkpoint: {0}")]
    DeserializationFailed(String),

    #[error("Checkpoint format version {found} is not readable (this build reads version {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
