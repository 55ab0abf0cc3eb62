//! The value passed to every hook during a transition attempt.

use super::state::MachineId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Consumer-supplied transition parameters.
///
/// The engine never reads or modifies them; they are handed to every hook
/// unchanged.
pub type Params = BTreeMap<String, Value>;

/// An attempted move from one state to another.
///
/// States are referenced by name. The machine fills in `from` and `to`
/// before any hook sees the value, and hooks only ever receive a shared
/// reference, so they cannot change it.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Transition;
/// use statecraft::params;
///
/// let transition = Transition::detached(params! { "param" => 2 })
///     .from_state("enabled")
///     .to_state("disabled");
///
/// assert_eq!(transition.from(), Some("enabled"));
/// assert_eq!(transition.to(), Some("disabled"));
/// assert_eq!(transition.param("param"), Some(&serde_json::json!(2)));
/// assert!(transition.machine().is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    machine: Option<MachineId>,
    from: Option<String>,
    to: Option<String>,
    #[serde(default)]
    params: Params,
}

impl Transition {
    /// Create a transition for a machine. `from` and `to` start unset.
    pub fn new(machine: Option<MachineId>, params: Params) -> Self {
        Self {
            machine,
            from: None,
            to: None,
            params,
        }
    }

    /// Create a transition that belongs to no machine.
    ///
    /// Useful for exercising a state's hooks in isolation.
    pub fn detached(params: Params) -> Self {
        Self::new(None, params)
    }

    pub fn from_state(mut self, name: impl Into<String>) -> Self {
        self.from = Some(name.into());
        self
    }

    pub fn to_state(mut self, name: impl Into<String>) -> Self {
        self.to = Some(name.into());
        self
    }

    pub(crate) fn with_from(mut self, name: Option<String>) -> Self {
        self.from = name;
        self
    }

    pub fn machine(&self) -> Option<MachineId> {
        self.machine
    }

    /// Name of the state being left, if the machine had a current state.
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Name of the destination state.
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// A state moving to itself. Such transitions still run every hook.
    pub fn is_self_transition(&self) -> bool {
        self.from.is_some() && self.from == self.to
    }
}
