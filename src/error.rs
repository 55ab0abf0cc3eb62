//! Errors raised by the state machine engine.
//!
//! A guard veto is not an error: `transition()` reports it as `Ok(false)`.
//! Everything in this module is structural misuse or a hook that failed.

use std::fmt;
use thiserror::Error;

/// Result type returned by state and observer hooks.
pub type HookResult<T> = Result<T, HookError>;

/// Failure raised from inside a hook or a delegated state method.
///
/// The engine never catches these; they abort the transition in progress
/// and surface to whoever called `transition()`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The point in the transition protocol where a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    BeforeTransition,
    BeforeExit,
    BeforeEnter,
    AfterExit,
    AfterEnter,
    AfterTransition,
    Method,
}

impl HookPoint {
    /// Whether a failure at this point happens after the commit.
    pub fn is_after_commit(&self) -> bool {
        matches!(
            self,
            Self::AfterExit | Self::AfterEnter | Self::AfterTransition
        )
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeTransition => "before_transition",
            Self::BeforeExit => "before_exit",
            Self::BeforeEnter => "before_enter",
            Self::AfterExit => "after_exit",
            Self::AfterEnter => "after_enter",
            Self::AfterTransition => "after_transition",
            Self::Method => "method",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`StateMachine`](crate::machine::StateMachine) operations.
#[derive(Debug, Error)]
pub enum StateMachineError {
    /// A transition or lookup named a state that is not registered.
    #[error("Unknown state '{name}'")]
    UnknownState { name: String },

    /// Registration would give two states the same name.
    #[error("Duplicate state name(s): {}", .names.join(", "))]
    DuplicateState { names: Vec<String> },

    /// A hook raised instead of returning.
    #[error("Hook {hook} failed{}: {source}", in_state(.state))]
    HookFailed {
        hook: HookPoint,
        state: Option<String>,
        #[source]
        source: HookError,
    },

    /// A dynamically dispatched machine method got arguments it cannot use.
    #[error("Invalid arguments for '{method}': {reason}")]
    InvalidArguments { method: String, reason: String },
}

fn in_state(state: &Option<String>) -> String {
    state
        .as_deref()
        .map(|name| format!(" in state '{name}'"))
        .unwrap_or_default()
}

impl StateMachineError {
    pub(crate) fn unknown_state(name: impl Into<String>) -> Self {
        Self::UnknownState { name: name.into() }
    }

    pub(crate) fn hook_failed(hook: HookPoint, state: Option<&str>, source: HookError) -> Self {
        Self::HookFailed {
            hook,
            state: state.map(str::to_string),
            source,
        }
    }
}
