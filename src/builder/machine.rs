//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{State, Transition};
use crate::error::HookResult;
use crate::machine::{violations, MachineConfig, Observer, StateMachine};

/// Builder for constructing state machines with a fluent API.
///
/// `build()` checks everything at once and reports every problem it
/// finds, rather than stopping at the first.
pub struct StateMachineBuilder {
    config: MachineConfig,
    states: Vec<Box<dyn State>>,
    before: Vec<Observer>,
    after: Vec<Observer>,
}

impl StateMachineBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
            states: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Replace all settings at once.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a state.
    pub fn state<S: State + 'static>(mut self, state: S) -> Self {
        self.states.push(Box::new(state));
        self
    }

    /// Add multiple boxed states at once.
    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn State>>,
    {
        self.states.extend(states);
        self
    }

    /// Set the state activated when none is current.
    pub fn default_state(mut self, name: impl Into<String>) -> Self {
        self.config.default_state_name = Some(name.into());
        self
    }

    pub fn enable_history(mut self, enable: bool) -> Self {
        self.config.enable_transition_history = enable;
        self
    }

    /// Bound the history. `None` keeps every record.
    pub fn max_history_size(mut self, size: Option<usize>) -> Self {
        self.config.maximum_transition_history_size = size;
        self
    }

    pub fn on_before_transition<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&Transition) -> HookResult<()> + Send + 'static,
    {
        self.before.push(Box::new(observer));
        self
    }

    pub fn on_after_transition<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&Transition) -> HookResult<()> + Send + 'static,
    {
        self.after.push(Box::new(observer));
        self
    }

    /// Build the state machine.
    ///
    /// Fails if names repeat, the default state is empty or not among the
    /// states, or history is enabled with no room for records.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        let found = violations(
            self.config
                .validate_with_states(self.states.iter().map(|state| state.name())),
        );
        if !found.is_empty() {
            return Err(BuildError::Invalid { violations: found });
        }

        let mut machine = StateMachine::with_config(self.config);
        machine.push_observers(self.before, self.after);
        machine.set_states(self.states)?;

        Ok(machine)
    }
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
