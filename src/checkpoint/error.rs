//! Checkpoint error types.

use thiserror::Error;

/// Errors raised while saving or resuming a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to serialize checkpoint: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    #[error("Failed to deserialize checkpoint: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    /// Written by a newer or older format than this build reads.
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The checkpoint's current state is not registered on the target machine.
    #[error("Checkpointed state '{name}' is not registered")]
    UnknownState { name: String },
}
