//! The state machine and its transition protocol.

use super::config::{unique_names, violations, ConfigViolation, MachineConfig};
use super::delegate::{CallContext, Delegate};
use crate::core::{MachineId, Params, State, Transition, TransitionHistory, TransitionRecord};
use crate::error::{HookError, HookPoint, HookResult, StateMachineError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Machine-level callback run before or after every transition.
///
/// Observers cannot veto. An `Err` aborts the transition like any other
/// hook failure.
pub type Observer = Box<dyn FnMut(&Transition) -> HookResult<()> + Send>;

/// A finite state machine with at most one current state.
///
/// The machine owns its states. Transitions run a fixed protocol:
/// exit guard, enter guard, commit, exit action, enter action, after
/// observers, then history. Either both guards pass and the whole commit
/// sequence runs, or nothing changes.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateBuilder;
/// use statecraft::core::Guard;
/// use statecraft::machine::StateMachine;
/// use statecraft::params;
///
/// let mut machine = StateMachine::new();
/// machine.add_state(StateBuilder::new("enabled").build()).unwrap();
/// machine.add_state(StateBuilder::new("disabled").build()).unwrap();
/// machine
///     .add_state(
///         StateBuilder::new("intermediate")
///             .enter_guard(Guard::blocking_from("enabled"))
///             .build(),
///     )
///     .unwrap();
/// machine.set_default_state_name("enabled");
///
/// assert!(machine.is("enabled"));
/// assert!(!machine.transition("intermediate", params! {}).unwrap());
/// assert!(machine.transition("disabled", params! {}).unwrap());
/// assert!(machine.transition("intermediate", params! {}).unwrap());
/// assert!(machine.transition("missing", params! {}).is_err());
/// ```
pub struct StateMachine {
    id: MachineId,
    states: BTreeMap<String, Box<dyn State>>,
    current: Option<String>,
    default_state: Option<String>,
    enable_history: bool,
    history: TransitionHistory,
    before_observers: Vec<Observer>,
    after_observers: Vec<Observer>,
    host: Option<String>,
}

impl StateMachine {
    /// Create an empty machine with default settings.
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    /// Create an empty machine from settings.
    ///
    /// The default state named by `config` is activated as soon as it is
    /// registered.
    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            id: MachineId::new(),
            states: BTreeMap::new(),
            current: None,
            default_state: config.default_state_name,
            enable_history: config.enable_transition_history,
            history: TransitionHistory::with_maximum_size(config.maximum_transition_history_size),
            before_observers: Vec::new(),
            after_observers: Vec::new(),
            host: None,
        }
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    /// Current settings.
    pub fn config(&self) -> MachineConfig {
        MachineConfig {
            default_state_name: self.default_state.clone(),
            enable_transition_history: self.enable_history,
            maximum_transition_history_size: self.history.maximum_size(),
        }
    }

    pub fn default_state_name(&self) -> Option<&str> {
        self.default_state.as_deref()
    }

    /// Set the default state.
    ///
    /// When no state is current and the default is registered, it becomes
    /// current immediately. No hooks run for that activation.
    pub fn set_default_state_name(&mut self, name: impl Into<String>) {
        self.default_state = Some(name.into());
        self.ensure_current();
    }

    pub fn clear_default_state_name(&mut self) {
        self.default_state = None;
    }

    pub fn transition_history_enabled(&self) -> bool {
        self.enable_history
    }

    /// Turn history recording on or off. Existing records are kept.
    pub fn set_enable_transition_history(&mut self, enable: bool) {
        self.enable_history = enable;
    }

    pub fn maximum_transition_history_size(&self) -> Option<usize> {
        self.history.maximum_size()
    }

    pub fn set_maximum_transition_history_size(&mut self, size: Option<usize>) {
        self.history.set_maximum_size(size);
    }

    pub fn transition_history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn clear_transition_history(&mut self) {
        self.history.clear();
    }

    pub(crate) fn replace_history(&mut self, history: TransitionHistory) {
        self.history = history;
    }

    /// Register a state, pointing it at this machine.
    pub fn add_state<S: State + 'static>(&mut self, state: S) -> Result<(), StateMachineError> {
        self.add_boxed_state(Box::new(state))
    }

    pub fn add_boxed_state(&mut self, mut state: Box<dyn State>) -> Result<(), StateMachineError> {
        let name = state.name().to_string();
        if self.states.contains_key(&name) {
            return Err(StateMachineError::DuplicateState { names: vec![name] });
        }

        state.base_mut().rehome(self.id);
        tracing::debug!(machine = %self.id, state = %name, "Registered state");
        self.states.insert(name, state);
        self.ensure_current();
        Ok(())
    }

    /// Unregister a state and hand it back.
    ///
    /// Removing the current state leaves the machine without one until the
    /// default or an explicit transition establishes another.
    pub fn remove_state(&mut self, name: &str) -> Option<Box<dyn State>> {
        let mut state = self.states.remove(name)?;
        state.base_mut().release();

        if self.current.as_deref() == Some(name) {
            tracing::debug!(machine = %self.id, state = %name, "Removed current state");
            self.current = None;
            self.ensure_current();
        } else {
            tracing::debug!(machine = %self.id, state = %name, "Removed state");
        }

        Some(state)
    }

    /// Replace every registered state.
    ///
    /// Fails without touching anything if the collection repeats a name;
    /// the error lists every repeated name. The current state survives
    /// only if a state with its name is part of the new collection.
    pub fn set_states<I>(&mut self, states: I) -> Result<(), StateMachineError>
    where
        I: IntoIterator<Item = Box<dyn State>>,
    {
        let states: Vec<Box<dyn State>> = states.into_iter().collect();

        let duplicates = violations(unique_names(states.iter().map(|s| s.name())));
        if !duplicates.is_empty() {
            let names = duplicates
                .into_iter()
                .filter_map(|violation| match violation {
                    ConfigViolation::DuplicateState { name } => Some(name),
                    _ => None,
                })
                .collect();
            return Err(StateMachineError::DuplicateState { names });
        }

        let id = self.id;
        for old in self.states.values_mut() {
            old.base_mut().release();
        }
        self.states = states
            .into_iter()
            .map(|mut state| {
                state.base_mut().rehome(id);
                (state.name().to_string(), state)
            })
            .collect();
        tracing::debug!(machine = %self.id, count = self.states.len(), "Replaced states");

        if let Some(current) = self.current.as_deref() {
            if !self.states.contains_key(current) {
                self.current = None;
            }
        }
        self.ensure_current();
        Ok(())
    }

    /// Registered state names in sorted order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.keys().map(String::as_str)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<&dyn State> {
        self.states.get(name).map(|state| state.as_ref())
    }

    pub fn state_mut(&mut self, name: &str) -> Option<&mut dyn State> {
        let state: &mut dyn State = self.states.get_mut(name)?.as_mut();
        Some(state)
    }

    /// Look up a state by name, failing with `UnknownState`.
    pub fn require_state(&self, name: &str) -> Result<&dyn State, StateMachineError> {
        self.state(name)
            .ok_or_else(|| StateMachineError::unknown_state(name))
    }

    /// The named state, or the current one when `name` is `None`.
    pub fn get_state(&self, name: Option<&str>) -> Option<&dyn State> {
        match name {
            Some(name) => self.state(name),
            None => self.current_state(),
        }
    }

    pub fn current_state(&self) -> Option<&dyn State> {
        self.current.as_deref().and_then(|name| self.state(name))
    }

    pub fn current_state_mut(&mut self) -> Option<&mut dyn State> {
        let name = self.current.clone()?;
        self.state_mut(&name)
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Whether the named state is current. Exact, case-sensitive match.
    pub fn is(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    /// Register an observer run before the guards of every transition.
    pub fn on_before_transition<F>(&mut self, observer: F)
    where
        F: FnMut(&Transition) -> HookResult<()> + Send + 'static,
    {
        self.before_observers.push(Box::new(observer));
    }

    /// Register an observer run after every committed transition.
    pub fn on_after_transition<F>(&mut self, observer: F)
    where
        F: FnMut(&Transition) -> HookResult<()> + Send + 'static,
    {
        self.after_observers.push(Box::new(observer));
    }

    pub(crate) fn push_observers(&mut self, before: Vec<Observer>, after: Vec<Observer>) {
        self.before_observers.extend(before);
        self.after_observers.extend(after);
    }

    /// Called when the machine is bound to a host.
    pub fn attach(&mut self, host: impl Into<String>) {
        let host = host.into();
        tracing::debug!(machine = %self.id, host = %host, "Attached to host");
        self.host = Some(host);
    }

    /// Called when the machine is unbound from its host.
    pub fn detach(&mut self) {
        if let Some(host) = self.host.take() {
            tracing::debug!(machine = %self.id, host = %host, "Detached from host");
        }
    }

    /// Name the machine is attached under, if any.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Move to the named state.
    ///
    /// Returns `Ok(true)` when the transition committed and `Ok(false)`
    /// when a guard vetoed it. An unknown target fails with
    /// `UnknownState` before anything runs.
    ///
    /// A hook that fails aborts the protocol where it stands. Before the
    /// commit that means nothing changed; after the commit the new state
    /// is current, later hooks are skipped and no history is recorded.
    pub fn transition(&mut self, to: &str, params: Params) -> Result<bool, StateMachineError> {
        if !self.states.contains_key(to) {
            return Err(StateMachineError::unknown_state(to));
        }
        self.ensure_current();

        let from = self.current.clone();
        let transition = Transition::new(Some(self.id), params)
            .with_from(from.clone())
            .to_state(to);

        for observer in &mut self.before_observers {
            observer(&transition).map_err(|e| hook_failure(HookPoint::BeforeTransition, None, e))?;
        }

        if let Some(from) = from.as_deref() {
            if !self.run_guard(HookPoint::BeforeExit, from, &transition)? {
                tracing::debug!(machine = %self.id, from, to, "Transition vetoed on exit");
                return Ok(false);
            }
        }

        if !self.run_guard(HookPoint::BeforeEnter, to, &transition)? {
            tracing::debug!(machine = %self.id, from = ?from, to, "Transition vetoed on enter");
            return Ok(false);
        }

        self.current = Some(to.to_string());
        tracing::debug!(machine = %self.id, from = ?from, to, "State transition committed");

        if let Some(from) = from.as_deref() {
            self.run_action(HookPoint::AfterExit, from, &transition)?;
        }
        self.run_action(HookPoint::AfterEnter, to, &transition)?;

        for observer in &mut self.after_observers {
            observer(&transition).map_err(|e| hook_failure(HookPoint::AfterTransition, None, e))?;
        }

        if self.enable_history {
            self.history.append(TransitionRecord::new(transition));
        }

        Ok(true)
    }

    fn run_guard(
        &mut self,
        hook: HookPoint,
        name: &str,
        transition: &Transition,
    ) -> Result<bool, StateMachineError> {
        let state = self
            .states
            .get_mut(name)
            .ok_or_else(|| StateMachineError::unknown_state(name))?;

        tracing::trace!(state = %name, %hook, "Running guard");
        let result = match hook {
            HookPoint::BeforeExit => state.before_exit(transition),
            _ => state.before_enter(transition),
        };

        result.map_err(|e| hook_failure(hook, Some(name), e))
    }

    fn run_action(
        &mut self,
        hook: HookPoint,
        name: &str,
        transition: &Transition,
    ) -> Result<(), StateMachineError> {
        let state = self
            .states
            .get_mut(name)
            .ok_or_else(|| StateMachineError::unknown_state(name))?;

        tracing::trace!(state = %name, %hook, "Running action");
        let result = match hook {
            HookPoint::AfterExit => state.after_exit(transition),
            _ => state.after_enter(transition),
        };

        result.map_err(|e| hook_failure(hook, Some(name), e))
    }

    /// Activate the default state if nothing is current and it is registered.
    fn ensure_current(&mut self) {
        if self.current.is_some() {
            return;
        }
        if let Some(default) = self.default_state.as_deref() {
            if self.states.contains_key(default) {
                tracing::debug!(machine = %self.id, state = %default, "Activated default state");
                self.current = Some(default.to_string());
            }
        }
    }

    pub(crate) fn restore_current(&mut self, name: Option<String>) {
        self.current = name;
        self.ensure_current();
    }

    fn call_state_method(
        &mut self,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, StateMachineError> {
        let Some(current) = self.current.clone() else {
            return Ok(None);
        };
        let Some(state) = self.states.get_mut(&current) else {
            return Ok(None);
        };

        let mut context = CallContext::new(self.id, current.as_str());
        let Some(result) = state.call(method, args, &mut context) else {
            return Ok(None);
        };
        let value = result.map_err(|e| hook_failure(HookPoint::Method, Some(&current), e))?;

        for request in context.into_requests() {
            if !self.transition(&request.to, request.params)? {
                tracing::debug!(
                    machine = %self.id,
                    method,
                    to = %request.to,
                    "Requested transition vetoed"
                );
                return Ok(Some(Value::Bool(false)));
            }
        }

        Ok(Some(value))
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("default_state", &self.default_state)
            .field("enable_history", &self.enable_history)
            .field("history", &self.history.count())
            .field("host", &self.host)
            .finish()
    }
}

/// Log a failed hook and wrap it. After-commit failures leave the new
/// state current, so they are reported as such.
fn hook_failure(hook: HookPoint, state: Option<&str>, error: HookError) -> StateMachineError {
    if hook.is_after_commit() {
        tracing::warn!(state = ?state, %hook, error = %error, "Hook failed after commit");
    } else {
        tracing::warn!(state = ?state, %hook, error = %error, "Hook failed, transition aborted");
    }
    StateMachineError::hook_failed(hook, state, error)
}

fn string_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, StateMachineError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| StateMachineError::InvalidArguments {
            method: method.to_string(),
            reason: format!("argument {index} must be a state name"),
        })
}

fn params_arg(method: &str, args: &[Value], index: usize) -> Result<Params, StateMachineError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(Params::new()),
        Some(Value::Object(map)) => Ok(map.clone().into_iter().collect()),
        Some(_) => Err(StateMachineError::InvalidArguments {
            method: method.to_string(),
            reason: format!("argument {index} must be an object of parameters"),
        }),
    }
}

/// The machine resolves its own methods (`is`, `transition`, `getState`)
/// and forwards everything else to the current state.
impl Delegate for StateMachine {
    fn get_member(&self, name: &str) -> Option<Value> {
        self.current_state()?.get(name)
    }

    fn has_member(&self, name: &str) -> bool {
        self.current_state().is_some_and(|state| state.has(name))
    }

    fn set_member(&mut self, name: &str, value: Value) -> bool {
        self.current_state_mut()
            .is_some_and(|state| state.set(name, value))
    }

    fn call_member(
        &mut self,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Value>, StateMachineError> {
        match name {
            "is" => {
                let state = string_arg(name, args, 0)?;
                Ok(Some(Value::Bool(self.is(state))))
            }
            "transition" => {
                let to = string_arg(name, args, 0)?.to_string();
                let params = params_arg(name, args, 1)?;
                Ok(Some(Value::Bool(self.transition(&to, params)?)))
            }
            "getState" => {
                let state = match args.first() {
                    None | Some(Value::Null) => self.current_state(),
                    Some(_) => self.state(string_arg(name, args, 0)?),
                };
                Ok(Some(
                    state
                        .map(|state| Value::String(state.name().to_string()))
                        .unwrap_or(Value::Null),
                ))
            }
            _ => self.call_state_method(name, args),
        }
    }
}
