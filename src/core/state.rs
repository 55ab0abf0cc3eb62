//! The State trait and the identity every state carries.
//!
//! A state is a named unit of behavior. It owns whatever data and methods
//! it wants to expose while current; the machine surfaces them through
//! [`get`](State::get), [`set`](State::set) and [`call`](State::call).

use super::transition::Transition;
use crate::error::HookResult;
use crate::machine::CallContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Handle identifying a state machine.
///
/// States hold this instead of a pointer to their machine: the machine
/// owns its states, a state only remembers which machine that is.
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

/// Identity block embedded in every state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBase {
    name: String,
    machine: Option<MachineId>,
}

impl StateBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            machine: None,
        }
    }

    /// Create the identity already pointing at a machine.
    pub fn with_machine(name: impl Into<String>, machine: MachineId) -> Self {
        Self {
            name: name.into(),
            machine: Some(machine),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn machine(&self) -> Option<MachineId> {
        self.machine
    }

    pub(crate) fn rehome(&mut self, machine: MachineId) {
        self.machine = Some(machine);
    }

    pub(crate) fn release(&mut self) {
        self.machine = None;
    }
}

/// Trait for state machine states.
///
/// Only [`base`](State::base) and [`base_mut`](State::base_mut) are
/// required. Every hook defaults to allowing the transition and doing
/// nothing; delegation defaults to "not found".
///
/// Guards veto by returning `Ok(false)`. Returning `Err` is not a veto:
/// it aborts the transition and propagates to the caller.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{State, StateBase, Transition};
/// use statecraft::HookResult;
/// use serde_json::{json, Value};
///
/// struct Intermediate {
///     base: StateBase,
/// }
///
/// impl State for Intermediate {
///     fn base(&self) -> &StateBase {
///         &self.base
///     }
///
///     fn base_mut(&mut self) -> &mut StateBase {
///         &mut self.base
///     }
///
///     fn before_enter(&mut self, transition: &Transition) -> HookResult<bool> {
///         Ok(transition.from() != Some("enabled"))
///     }
///
///     fn get(&self, member: &str) -> Option<Value> {
///         match member {
///             "isEnabled" => Some(Value::Null),
///             _ => None,
///         }
///     }
/// }
///
/// let mut state = Intermediate { base: StateBase::new("intermediate") };
/// let blocked = Transition::detached(Default::default())
///     .from_state("enabled")
///     .to_state("intermediate");
///
/// assert_eq!(state.name(), "intermediate");
/// assert!(!state.before_enter(&blocked).unwrap());
/// assert!(!state.has("isEnabled"));
/// ```
pub trait State: Send {
    fn base(&self) -> &StateBase;

    fn base_mut(&mut self) -> &mut StateBase;

    /// The state's name, unique within its machine.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// The machine this state is registered with, if any.
    fn machine(&self) -> Option<MachineId> {
        self.base().machine()
    }

    /// Guard run on the destination state. `Ok(false)` vetoes.
    fn before_enter(&mut self, _transition: &Transition) -> HookResult<bool> {
        Ok(true)
    }

    /// Runs on the destination state once the transition is committed.
    fn after_enter(&mut self, _transition: &Transition) -> HookResult<()> {
        Ok(())
    }

    /// Guard run on the state being left. `Ok(false)` vetoes.
    fn before_exit(&mut self, _transition: &Transition) -> HookResult<bool> {
        Ok(true)
    }

    /// Runs on the state being left once the transition is committed.
    fn after_exit(&mut self, _transition: &Transition) -> HookResult<()> {
        Ok(())
    }

    /// Read a state-scoped member. `None` means not found here.
    fn get(&self, _member: &str) -> Option<Value> {
        None
    }

    /// Whether a member exists and holds a non-null value.
    fn has(&self, member: &str) -> bool {
        self.get(member).is_some_and(|value| !value.is_null())
    }

    /// Write a state-scoped member. Returns `false` when the member is unknown.
    fn set(&mut self, _member: &str, _value: Value) -> bool {
        false
    }

    /// Invoke a state-scoped method. `None` means not found here.
    ///
    /// Follow-up transitions are requested through `context`; the machine
    /// runs them after this call returns.
    fn call(
        &mut self,
        _method: &str,
        _args: &[Value],
        _context: &mut CallContext,
    ) -> Option<HookResult<Value>> {
        None
    }
}

impl fmt::Debug for dyn State + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name())
            .field("machine", &self.machine())
            .finish()
    }
}
