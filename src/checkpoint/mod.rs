//! Checkpoint and resume functionality for state machines.
//!
//! A checkpoint captures what a machine knows about its progress: the
//! current state name, its settings and its transition history. States
//! themselves are code and are not serialized; a checkpoint is resumed
//! into a machine that already has the same states registered.

use crate::core::{MachineId, TransitionHistory};
use crate::machine::{MachineConfig, StateMachine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's progress.
/// Does NOT include states, observers or the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Machine the checkpoint was taken from
    pub machine: MachineId,

    /// Name of the current state, if any
    pub current_state: Option<String>,

    /// Machine settings at the time of the checkpoint
    pub config: MachineConfig,

    /// Recorded transitions, oldest first
    pub history: TransitionHistory,
}

impl Checkpoint {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(CheckpointError::SerializationFailed)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(CheckpointError::SerializationFailed)
    }

    /// Deserialize from JSON, rejecting unknown format versions.
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(CheckpointError::DeserializationFailed)?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }
}

impl StateMachine {
    /// Capture the machine's progress.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine: self.id(),
            current_state: self.current_state_name().map(str::to_string),
            config: self.config(),
            history: self.transition_history().clone(),
        }
    }

    /// Restore progress from a checkpoint.
    ///
    /// The checkpointed current state must be registered on this machine.
    /// No hooks or observers run and nothing is added to the history. On
    /// error the machine is left unchanged.
    pub fn resume(&mut self, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        checkpoint.check_version()?;

        if let Some(current) = checkpoint.current_state.as_deref() {
            if self.state(current).is_none() {
                return Err(CheckpointError::UnknownState {
                    name: current.to_string(),
                });
            }
        }

        let Checkpoint {
            id,
            current_state,
            config,
            mut history,
            ..
        } = checkpoint;

        history.set_maximum_size(config.maximum_transition_history_size);
        self.replace_history(history);
        self.set_enable_transition_history(config.enable_transition_history);
        match config.default_state_name {
            Some(name) => self.set_default_state_name(name),
            None => self.clear_default_state_name(),
        }
        self.restore_current(current_state);

        tracing::info!(
            machine = %self.id(),
            checkpoint = %id,
            state = ?self.current_state_name(),
            "Resumed from checkpoint"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;
    use crate::core::Params;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn machine() -> StateMachine {
        let mut machine = StateMachine::new();
        for name in ["draft", "review", "published"] {
            machine.add_state(StateBuilder::new(name).build()).unwrap();
        }
        machine.set_default_state_name("draft");
        machine.set_enable_transition_history(true);
        machine
    }

    #[test]
    fn checkpoint_captures_progress() {
        let mut original = machine();
        original.transition("review", Params::new()).unwrap();

        let checkpoint = original.checkpoint();
        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.machine, original.id());
        assert_eq!(checkpoint.current_state.as_deref(), Some("review"));
        assert_eq!(checkpoint.config, original.config());
        assert_eq!(checkpoint.history.count(), 1);
    }

    #[test]
    fn json_round_trip_preserves_checkpoint() {
        let mut original = machine();
        original
            .transition("review", crate::params! { "reviewer" => "ada" })
            .unwrap();

        let checkpoint = original.checkpoint();
        let json = checkpoint.to_json().unwrap();
        let restored = Checkpoint::from_json(&json).unwrap();

        assert_eq!(restored, checkpoint);
        assert!(checkpoint.to_json_pretty().unwrap().contains('\n'));
    }

    #[test]
    fn resume_restores_state_and_history_without_hooks() {
        let mut original = machine();
        original.transition("review", Params::new()).unwrap();
        original.transition("published", Params::new()).unwrap();
        let json = original.checkpoint().to_json().unwrap();

        let entered = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&entered);
        let mut fresh = machine();
        fresh.on_after_transition(move |_| {
            *counter.lock() += 1;
            Ok(())
        });

        fresh.resume(Checkpoint::from_json(&json).unwrap()).unwrap();

        assert!(fresh.is("published"));
        assert_eq!(*entered.lock(), 0);
        assert_eq!(fresh.transition_history().path(), vec!["draft", "review", "published"]);

        fresh.transition("draft", Params::new()).unwrap();
        assert_eq!(*entered.lock(), 1);
        assert_eq!(fresh.transition_history().count(), 3);
    }

    #[test]
    fn resume_applies_settings() {
        let mut original = machine();
        original.set_maximum_transition_history_size(Some(3));
        original.set_default_state_name("review");
        let checkpoint = original.checkpoint();

        let mut fresh = machine();
        fresh.resume(checkpoint).unwrap();

        assert_eq!(fresh.maximum_transition_history_size(), Some(3));
        assert_eq!(fresh.default_state_name(), Some("review"));
        assert!(fresh.transition_history_enabled());
    }

    #[test]
    fn resume_rejects_unregistered_current_state() {
        let mut original = machine();
        original.transition("published", Params::new()).unwrap();
        let checkpoint = original.checkpoint();

        let mut other = StateMachine::new();
        other.add_state(StateBuilder::new("draft").build()).unwrap();
        other.set_default_state_name("draft");

        let err = other.resume(checkpoint).unwrap_err();
        assert!(matches!(err, CheckpointError::UnknownState { ref name } if name == "published"));
        assert!(other.is("draft"));
        assert!(other.transition_history().is_empty());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut checkpoint = machine().checkpoint();
        checkpoint.version = CHECKPOINT_VERSION + 1;
        let json = checkpoint.to_json().unwrap();

        match Checkpoint::from_json(&json) {
            Err(CheckpointError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, CHECKPOINT_VERSION + 1);
                assert_eq!(supported, CHECKPOINT_VERSION);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }

        let mut fresh = machine();
        assert!(matches!(
            fresh.resume(checkpoint),
            Err(CheckpointError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_deserialization_error() {
        assert!(matches!(
            Checkpoint::from_json("{ not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn resume_without_current_or_default_clears_current() {
        let empty = StateMachine::new().checkpoint();
        assert!(empty.current_state.is_none());

        let mut fresh = machine();
        fresh.transition("review", Params::new()).unwrap();
        fresh.resume(empty).unwrap();

        assert!(fresh.current_state_name().is_none());
        assert!(fresh.default_state_name().is_none());
    }
}
