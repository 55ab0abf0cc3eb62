//! Explicit member resolution across layers.
//!
//! Each layer (state, machine, host) answers "do you have this member?"
//! with a value or `None`. A layer that cannot resolve a name hands the
//! question to the next one; `None` coming out of the outermost layer
//! means the member does not exist anywhere.

use crate::core::{MachineId, Params};
use crate::error::StateMachineError;
use serde_json::Value;

/// Resolution contract implemented by machines and hosts.
pub trait Delegate {
    /// Read a member. `None` means not found.
    fn get_member(&self, name: &str) -> Option<Value>;

    /// Whether a member exists and is not null.
    fn has_member(&self, name: &str) -> bool {
        self.get_member(name).is_some_and(|value| !value.is_null())
    }

    /// Write a member. Returns `false` when no layer knows it.
    fn set_member(&mut self, name: &str, value: Value) -> bool;

    /// Invoke a method. `Ok(None)` means not found.
    fn call_member(
        &mut self,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>, StateMachineError>;
}

/// A follow-up transition requested by a state method.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRequest {
    pub to: String,
    pub params: Params,
}

/// What a state method can see of, and ask from, its machine.
///
/// Methods never hold the machine itself. They queue transitions here and
/// the machine runs them, in order, once the method has returned.
#[derive(Debug)]
pub struct CallContext {
    machine: MachineId,
    state: String,
    requests: Vec<TransitionRequest>,
}

impl CallContext {
    pub fn new(machine: MachineId, state: impl Into<String>) -> Self {
        Self {
            machine,
            state: state.into(),
            requests: Vec::new(),
        }
    }

    pub fn machine(&self) -> MachineId {
        self.machine
    }

    /// Name of the state whose method is running.
    pub fn state_name(&self) -> &str {
        &self.state
    }

    /// Ask the machine to transition once the current call completes.
    ///
    /// Requests run in order with the full protocol. The first one a guard
    /// vetoes stops the rest, and the call then yields `false` in place of
    /// the method's own value. An error stops the rest as well and is
    /// returned; requests committed before it stay committed.
    pub fn transition(&mut self, to: impl Into<String>, params: Params) {
        self.requests.push(TransitionRequest {
            to: to.into(),
            params,
        });
    }

    pub fn requests(&self) -> &[TransitionRequest] {
        &self.requests
    }

    pub(crate) fn into_requests(self) -> Vec<TransitionRequest> {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn requests_are_kept_in_order() {
        let id = MachineId::new();
        let mut context = CallContext::new(id, "enabled");

        context.transition("disabled", Params::new());
        context.transition("intermediate", params! { "why" => "test" });

        assert_eq!(context.machine(), id);
        assert_eq!(context.state_name(), "enabled");
        let targets: Vec<_> = context.requests().iter().map(|r| r.to.as_str()).collect();
        assert_eq!(targets, vec!["disabled", "intermediate"]);
        assert_eq!(context.into_requests()[1].params, params! { "why" => "test" });
    }
}
