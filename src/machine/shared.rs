//! A machine shared between threads.
//!
//! Every operation holds one lock for its whole duration, so guard
//! evaluation and commit are observed as a single step. Hooks and
//! observers must not call back into the same `SharedStateMachine`:
//! the lock is not reentrant.

use super::delegate::Delegate;
use super::state_machine::StateMachine;
use crate::core::Params;
use crate::error::StateMachineError;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Cloneable handle to a machine behind a mutex.
#[derive(Clone, Debug)]
pub struct SharedStateMachine {
    inner: Arc<Mutex<StateMachine>>,
}

impl SharedStateMachine {
    pub fn new(machine: StateMachine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    pub fn transition(&self, to: &str, params: Params) -> Result<bool, StateMachineError> {
        self.inner.lock().transition(to, params)
    }

    pub fn is(&self, name: &str) -> bool {
        self.inner.lock().is(name)
    }

    pub fn current_state_name(&self) -> Option<String> {
        self.inner.lock().current_state_name().map(str::to_string)
    }

    pub fn get_member(&self, name: &str) -> Option<Value> {
        self.inner.lock().get_member(name)
    }

    pub fn call_member(
        &self,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>, StateMachineError> {
        self.inner.lock().call_member(name, args)
    }

    /// Run a closure with exclusive access to the machine.
    pub fn with<R>(&self, f: impl FnOnce(&mut StateMachine) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Take the machine back if this is the last handle.
    pub fn try_unwrap(self) -> Result<StateMachine, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<StateMachine> for SharedStateMachine {
    fn from(machine: StateMachine) -> Self {
        Self::new(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;
    use serde_json::json;
    use std::thread;

    fn toggle() -> StateMachine {
        let mut machine = StateMachine::new();
        machine
            .add_state(StateBuilder::new("on").member("lit", json!(true)).build())
            .unwrap();
        machine
            .add_state(StateBuilder::new("off").member("lit", json!(false)).build())
            .unwrap();
        machine.set_default_state_name("off");
        machine.set_enable_transition_history(true);
        machine.set_maximum_transition_history_size(None);
        machine
    }

    #[test]
    fn concurrent_transitions_are_serialized() {
        let shared = SharedStateMachine::new(toggle());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let to = if i % 2 == 0 { "on" } else { "off" };
                        shared.transition(to, Params::new()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let machine = shared.try_unwrap().unwrap();
        let history = machine.transition_history();
        assert_eq!(history.count(), 200);

        // Each record starts where the previous one ended.
        let records: Vec<_> = history.iter().rev().collect();
        for pair in records.windows(2) {
            assert_eq!(pair[0].to(), pair[1].from());
        }
    }

    #[test]
    fn delegated_reads_follow_current_state() {
        let shared = SharedStateMachine::new(toggle());
        assert_eq!(shared.get_member("lit"), Some(json!(false)));

        assert!(shared.transition("on", Params::new()).unwrap());
        assert!(shared.is("on"));
        assert_eq!(shared.current_state_name().as_deref(), Some("on"));
        assert_eq!(shared.get_member("lit"), Some(json!(true)));
        assert_eq!(
            shared.call_member("is", &[json!("on")]).unwrap(),
            Some(json!(true))
        );
    }

    #[test]
    fn try_unwrap_fails_while_shared() {
        let shared = SharedStateMachine::from(toggle());
        let other = shared.clone();

        let shared = shared.try_unwrap().unwrap_err();
        drop(other);
        assert!(shared.try_unwrap().is_ok());
    }

    #[test]
    fn with_gives_exclusive_access() {
        let shared = SharedStateMachine::new(toggle());
        let count = shared.with(|machine| {
            machine.transition("on", Params::new()).unwrap();
            machine.transition_history().count()
        });
        assert_eq!(count, 1);
    }
}
