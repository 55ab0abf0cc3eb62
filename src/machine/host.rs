//! Attaching machines to host objects.
//!
//! A host gains its machine's behavior through explicit forwarding:
//! either it implements [`StateMachineHost`] over a machine field it owns,
//! or it is a [`Component`] holding named behaviors that it asks in turn.

use super::delegate::Delegate;
use super::state_machine::StateMachine;
use crate::core::{Params, State};
use crate::error::StateMachineError;
use serde_json::Value;

/// Forwarding interface for a type that owns a state machine.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateBuilder;
/// use statecraft::machine::{StateMachine, StateMachineHost};
/// use statecraft::params;
///
/// struct Door {
///     status: StateMachine,
/// }
///
/// impl StateMachineHost for Door {
///     fn state_machine(&self) -> &StateMachine {
///         &self.status
///     }
///
///     fn state_machine_mut(&mut self) -> &mut StateMachine {
///         &mut self.status
///     }
/// }
///
/// let mut status = StateMachine::new();
/// status.add_state(StateBuilder::new("closed").build()).unwrap();
/// status.add_state(StateBuilder::new("open").build()).unwrap();
/// status.set_default_state_name("closed");
///
/// let mut door = Door { status };
/// assert!(door.is("closed"));
/// assert!(door.transition("open", params! {}).unwrap());
/// assert_eq!(door.current_state_name(), Some("open"));
/// ```
pub trait StateMachineHost {
    fn state_machine(&self) -> &StateMachine;

    fn state_machine_mut(&mut self) -> &mut StateMachine;

    fn is(&self, name: &str) -> bool {
        self.state_machine().is(name)
    }

    fn transition(&mut self, to: &str, params: Params) -> Result<bool, StateMachineError> {
        self.state_machine_mut().transition(to, params)
    }

    fn state(&self, name: Option<&str>) -> Option<&dyn State> {
        self.state_machine().get_state(name)
    }

    fn current_state_name(&self) -> Option<&str> {
        self.state_machine().current_state_name()
    }
}

/// A host object holding machines as named behaviors.
///
/// Unresolved member access on the component is offered to each behavior
/// in attachment order; the first one that resolves it wins. A behavior
/// that fails while resolving a call ends the search: its error is
/// returned and later behaviors are not asked.
#[derive(Debug, Default)]
pub struct Component {
    behaviors: Vec<(String, StateMachine)>,
}

impl Component {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a machine under `name`, calling its `attach` callback.
    ///
    /// A behavior already attached under that name is detached and
    /// returned.
    pub fn attach_behavior(
        &mut self,
        name: impl Into<String>,
        mut machine: StateMachine,
    ) -> Option<StateMachine> {
        let name = name.into();
        let previous = self.detach_behavior(&name);
        machine.attach(name.as_str());
        self.behaviors.push((name, machine));
        previous
    }

    /// Detach the named behavior, calling its `detach` callback.
    pub fn detach_behavior(&mut self, name: &str) -> Option<StateMachine> {
        let index = self.behaviors.iter().position(|(n, _)| n == name)?;
        let (_, mut machine) = self.behaviors.remove(index);
        machine.detach();
        Some(machine)
    }

    pub fn behavior(&self, name: &str) -> Option<&StateMachine> {
        self.behaviors
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, machine)| machine)
    }

    pub fn behavior_mut(&mut self, name: &str) -> Option<&mut StateMachine> {
        self.behaviors
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, machine)| machine)
    }

    /// Names of attached behaviors in attachment order.
    pub fn behavior_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.behaviors.iter().map(|(name, _)| name.as_str())
    }
}

impl Delegate for Component {
    fn get_member(&self, name: &str) -> Option<Value> {
        self.behaviors
            .iter()
            .find_map(|(_, machine)| machine.get_member(name))
    }

    fn has_member(&self, name: &str) -> bool {
        self.behaviors
            .iter()
            .any(|(_, machine)| machine.has_member(name))
    }

    fn set_member(&mut self, name: &str, value: Value) -> bool {
        for (_, machine) in &mut self.behaviors {
            if machine.set_member(name, value.clone()) {
                return true;
            }
        }
        false
    }

    fn call_member(
        &mut self,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>, StateMachineError> {
        for (_, machine) in &mut self.behaviors {
            if let Some(value) = machine.call_member(name, args)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
