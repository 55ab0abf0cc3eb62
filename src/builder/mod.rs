//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders for machines and for states
//! assembled from values and closures, plus the `params!` macro.

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use state::{Action, DynamicState, Method, StateBuilder};

use crate::core::{Guard, State};

/// Create a state with no members, methods or guards.
///
/// # Example
///
/// ```
/// use statecraft::builder::plain_state;
/// use statecraft::core::State;
///
/// let state = plain_state("idle");
/// assert_eq!(state.name(), "idle");
/// ```
pub fn plain_state(name: impl Into<String>) -> DynamicState {
    StateBuilder::new(name).build()
}

/// Create a state that refuses to be entered from `blocked_from`.
///
/// # Example
///
/// ```
/// use statecraft::builder::guarded_state;
/// use statecraft::core::{State, Transition};
///
/// let mut state = guarded_state("intermediate", "enabled");
/// let from_enabled = Transition::detached(Default::default())
///     .from_state("enabled")
///     .to_state("intermediate");
/// assert!(!state.before_enter(&from_enabled).unwrap());
/// ```
pub fn guarded_state(name: impl Into<String>, blocked_from: impl Into<String>) -> DynamicState {
    StateBuilder::new(name)
        .enter_guard(Guard::blocking_from(blocked_from))
        .build()
}

/// Box a collection of states for [`StateMachine::set_states`](crate::machine::StateMachine::set_states).
pub fn boxed<S, I>(states: I) -> Vec<Box<dyn State>>
where
    S: State + 'static,
    I: IntoIterator<Item = S>,
{
    states
        .into_iter()
        .map(|state| Box::new(state) as Box<dyn State>)
        .collect()
}
