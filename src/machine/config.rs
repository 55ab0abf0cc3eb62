//! Machine settings and their validation.
//!
//! Validation accumulates every violation instead of stopping at the
//! first one, so a bad configuration is reported in a single pass.

use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// History bound used when none is configured.
pub const DEFAULT_MAXIMUM_TRANSITION_HISTORY_SIZE: usize = 10;

/// Problems found while validating a machine configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("State name '{name}' is registered more than once")]
    DuplicateState { name: String },

    #[error("Default state '{name}' is not registered")]
    UnknownDefaultState { name: String },

    #[error("Default state name is empty")]
    EmptyDefaultStateName,

    #[error("Transition history is enabled with a maximum size of zero")]
    ZeroHistoryCapacity,
}

/// Type alias for accumulated validation results.
pub type ConfigValidation = Validation<(), NonEmptyVec<ConfigViolation>>;

/// Settings of a [`StateMachine`](super::StateMachine).
///
/// Deserializes with every field optional:
///
/// ```rust
/// use statecraft::machine::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "enable_transition_history": true }"#).unwrap();
/// assert!(config.enable_transition_history);
/// assert_eq!(config.maximum_transition_history_size, Some(10));
/// assert!(config.default_state_name.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// State activated automatically when no state is current.
    pub default_state_name: Option<String>,

    /// Record committed transitions.
    pub enable_transition_history: bool,

    /// Bound on recorded transitions. `None` keeps everything.
    pub maximum_transition_history_size: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            default_state_name: None,
            enable_transition_history: false,
            maximum_transition_history_size: Some(DEFAULT_MAXIMUM_TRANSITION_HISTORY_SIZE),
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the settings on their own, accumulating ALL violations.
    pub fn validate(&self) -> ConfigValidation {
        let mut checks: Vec<ConfigValidation> = Vec::new();

        if self.default_state_name.as_deref() == Some("") {
            checks.push(Validation::fail(ConfigViolation::EmptyDefaultStateName));
        }

        if self.enable_transition_history && self.maximum_transition_history_size == Some(0) {
            checks.push(Validation::fail(ConfigViolation::ZeroHistoryCapacity));
        }

        collect(checks)
    }

    /// Validate the settings against the names of the states they will govern.
    pub fn validate_with_states<'a, I>(&self, names: I) -> ConfigValidation
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = names.into_iter().collect();
        let mut checks = vec![self.validate(), unique_names(names.iter().copied())];

        if let Some(default) = self.default_state_name.as_deref() {
            if !default.is_empty() && !names.contains(&default) {
                checks.push(Validation::fail(ConfigViolation::UnknownDefaultState {
                    name: default.to_string(),
                }));
            }
        }

        collect(checks)
    }
}

/// Check that no name appears twice. Each repeated name is reported once.
pub fn unique_names<'a, I>(names: I) -> ConfigValidation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::BTreeSet::new();
    let mut reported = std::collections::BTreeSet::new();
    let mut checks: Vec<ConfigValidation> = Vec::new();

    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            checks.push(Validation::fail(ConfigViolation::DuplicateState {
                name: name.to_string(),
            }));
        }
    }

    collect(checks)
}

fn collect(checks: Vec<ConfigValidation>) -> ConfigValidation {
    Validation::all_vec(checks).map(|_| ())
}

/// Flatten a failed validation into a plain list.
pub(crate) fn violations(validation: ConfigValidation) -> Vec<ConfigViolation> {
    match validation {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}
