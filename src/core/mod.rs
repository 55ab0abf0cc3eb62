//! Core state machine types.
//!
//! This module contains the building blocks the machine works with:
//! - States via the `State` trait and their `StateBase` identity
//! - Transitions and their parameters
//! - Guard predicates
//! - Bounded transition history

mod guard;
mod history;
mod state;
mod transition;

pub use guard::Guard;
pub use history::{TransitionHistory, TransitionRecord};
pub use state::{MachineId, State, StateBase};
pub use transition::{Params, Transition};
