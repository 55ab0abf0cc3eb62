//! Build errors for the state machine builder.

use crate::error::StateMachineError;
use crate::machine::ConfigViolation;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    /// One or more configuration checks failed. Every violation is listed.
    #[error("Invalid state machine configuration: {}", describe(.violations))]
    Invalid { violations: Vec<ConfigViolation> },

    /// The machine rejected the validated states.
    #[error(transparent)]
    Machine(#[from] StateMachineError),
}

impl BuildError {
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            Self::Invalid { violations } => violations,
            Self::Machine(_) => &[],
        }
    }
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
