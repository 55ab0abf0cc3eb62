//! Builder for states assembled from closures and values.

use crate::core::{Guard, State, StateBase, Transition};
use crate::error::HookResult;
use crate::machine::CallContext;
use serde_json::Value;
use std::collections::BTreeMap;

/// A state method: receives call arguments and the machine context.
pub type Method = Box<dyn FnMut(&[Value], &mut CallContext) -> HookResult<Value> + Send>;

/// Action run after a committed transition.
pub type Action = Box<dyn FnMut(&Transition) -> HookResult<()> + Send>;

/// A state defined by data rather than by a dedicated type.
///
/// Members are plain values readable and writable through delegation.
/// Writing only succeeds for members the state declared.
pub struct DynamicState {
    base: StateBase,
    members: BTreeMap<String, Value>,
    methods: BTreeMap<String, Method>,
    enter_guards: Vec<Guard>,
    exit_guards: Vec<Guard>,
    on_enter: Vec<Action>,
    on_exit: Vec<Action>,
}

impl DynamicState {
    /// Declared member names in sorted order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.keys().map(String::as_str)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.methods.keys().map(String::as_str)
    }
}

impl State for DynamicState {
    fn base(&self) -> &StateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut StateBase {
        &mut self.base
    }

    fn before_enter(&mut self, transition: &Transition) -> HookResult<bool> {
        Ok(self.enter_guards.iter().all(|guard| guard.check(transition)))
    }

    fn after_enter(&mut self, transition: &Transition) -> HookResult<()> {
        self.on_enter.iter_mut().try_for_each(|action| action(transition))
    }

    fn before_exit(&mut self, transition: &Transition) -> HookResult<bool> {
        Ok(self.exit_guards.iter().all(|guard| guard.check(transition)))
    }

    fn after_exit(&mut self, transition: &Transition) -> HookResult<()> {
        self.on_exit.iter_mut().try_for_each(|action| action(transition))
    }

    fn get(&self, member: &str) -> Option<Value> {
        self.members.get(member).cloned()
    }

    fn set(&mut self, member: &str, value: Value) -> bool {
        match self.members.get_mut(member) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn call(
        &mut self,
        method: &str,
        args: &[Value],
        context: &mut CallContext,
    ) -> Option<HookResult<Value>> {
        let method = self.methods.get_mut(method)?;
        Some(method(args, context))
    }
}

/// Fluent builder for [`DynamicState`].
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateBuilder;
/// use statecraft::core::{Params, State};
/// use serde_json::json;
///
/// let enabled = StateBuilder::new("enabled")
///     .member("isEnabled", json!(true))
///     .method("disable", |_, ctx| {
///         ctx.transition("disabled", Params::new());
///         Ok(json!(null))
///     })
///     .build();
///
/// assert_eq!(enabled.name(), "enabled");
/// assert_eq!(enabled.get("isEnabled"), Some(json!(true)));
/// ```
pub struct StateBuilder {
    name: String,
    members: BTreeMap<String, Value>,
    methods: BTreeMap<String, Method>,
    enter_guards: Vec<Guard>,
    exit_guards: Vec<Guard>,
    on_enter: Vec<Action>,
    on_exit: Vec<Action>,
}

impl StateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
            methods: BTreeMap::new(),
            enter_guards: Vec::new(),
            exit_guards: Vec::new(),
            on_enter: Vec::new(),
            on_exit: Vec::new(),
        }
    }

    /// Declare a member with its initial value.
    pub fn member(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    /// Declare a method.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: FnMut(&[Value], &mut CallContext) -> HookResult<Value> + Send + 'static,
    {
        self.methods.insert(name.into(), Box::new(method));
        self
    }

    /// Add a guard every entering transition must pass.
    pub fn enter_guard(mut self, guard: Guard) -> Self {
        self.enter_guards.push(guard);
        self
    }

    /// Add an entry guard from a closure.
    pub fn enter_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Transition) -> bool + Send + Sync + 'static,
    {
        self.enter_guard(Guard::new(predicate))
    }

    /// Add a guard every exiting transition must pass.
    pub fn exit_guard(mut self, guard: Guard) -> Self {
        self.exit_guards.push(guard);
        self
    }

    pub fn exit_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Transition) -> bool + Send + Sync + 'static,
    {
        self.exit_guard(Guard::new(predicate))
    }

    /// Run an action after this state has been entered.
    pub fn on_enter<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Transition) -> HookResult<()> + Send + 'static,
    {
        self.on_enter.push(Box::new(action));
        self
    }

    /// Run an action after this state has been left.
    pub fn on_exit<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Transition) -> HookResult<()> + Send + 'static,
    {
        self.on_exit.push(Box::new(action));
        self
    }

    pub fn build(self) -> DynamicState {
        DynamicState {
            base: StateBase::new(self.name),
            members: self.members,
            methods: self.methods,
            enter_guards: self.enter_guards,
            exit_guards: self.exit_guards,
            on_enter: self.on_enter,
            on_exit: self.on_exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MachineId, Params};
    use crate::error::HookError;
    use serde_json::json;
    use std::sync::Arc;
    use parking_lot::Mutex;

    fn between(from: &str, to: &str) -> Transition {
        Transition::detached(Params::new()).from_state(from).to_state(to)
    }

    #[test]
    fn members_are_readable_and_writable() {
        let mut state = StateBuilder::new("enabled")
            .member("isEnabled", json!(true))
            .member("testProperty", json!(true))
            .build();

        assert_eq!(state.get("isEnabled"), Some(json!(true)));
        assert!(state.has("testProperty"));
        assert!(state.set("isEnabled", json!(false)));
        assert_eq!(state.get("isEnabled"), Some(json!(false)));
        assert!(!state.set("undeclared", json!(1)));
        assert!(state.get("undeclared").is_none());
        assert_eq!(
            state.member_names().collect::<Vec<_>>(),
            vec!["isEnabled", "testProperty"]
        );
    }

    #[test]
    fn all_enter_guards_must_pass() {
        let mut state = StateBuilder::new("intermediate")
            .enter_guard(Guard::blocking_from("enabled"))
            .enter_when(|t| t.param("blocked").is_none())
            .build();

        assert!(!state.before_enter(&between("enabled", "intermediate")).unwrap());
        assert!(state.before_enter(&between("disabled", "intermediate")).unwrap());

        let blocked = Transition::detached(crate::params! { "blocked" => true })
            .from_state("disabled")
            .to_state("intermediate");
        assert!(!state.before_enter(&blocked).unwrap());
    }

    #[test]
    fn exit_guards_veto_leaving() {
        let mut state = StateBuilder::new("locked")
            .exit_when(|t| t.to() == Some("unlocked"))
            .build();

        assert!(state.before_exit(&between("locked", "unlocked")).unwrap());
        assert!(!state.before_exit(&between("locked", "open")).unwrap());
    }

    #[test]
    fn actions_run_in_order_and_stop_on_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&log);
        let third = Arc::clone(&log);
        let mut state = StateBuilder::new("s")
            .on_enter(move |_| {
                first.lock().push("first");
                Ok(())
            })
            .on_enter(|_| Err(HookError::new("second failed")))
            .on_enter(move |_| {
                third.lock().push("third");
                Ok(())
            })
            .build();

        let err = state.after_enter(&between("a", "s")).unwrap_err();
        assert_eq!(err.message(), "second failed");
        assert_eq!(*log.lock(), vec!["first"]);
        assert!(state.after_exit(&between("s", "a")).is_ok());
    }

    #[test]
    fn methods_can_request_transitions() {
        let mut state = StateBuilder::new("enabled")
            .method("disable", |_, ctx| {
                ctx.transition("disabled", Params::new());
                Ok(Value::Null)
            })
            .method("echo", |args, _| Ok(args.first().cloned().unwrap_or(Value::Null)))
            .build();
        let mut context = CallContext::new(MachineId::new(), "enabled");

        assert_eq!(
            state.call("echo", &[json!(5)], &mut context).unwrap().unwrap(),
            json!(5)
        );
        assert!(context.requests().is_empty());

        state.call("disable", &[], &mut context).unwrap().unwrap();
        assert_eq!(context.requests()[0].to, "disabled");

        assert!(state.call("missing", &[], &mut context).is_none());
        assert_eq!(state.method_names().collect::<Vec<_>>(), vec!["disable", "echo"]);
    }

    #[test]
    fn built_state_has_no_machine() {
        let state = StateBuilder::new("free").build();
        assert!(state.machine().is_none());
        assert_eq!(state.name(), "free");
    }
}
