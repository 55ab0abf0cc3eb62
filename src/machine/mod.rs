//! The state machine and the layers around it.
//!
//! - `StateMachine` runs the guarded transition protocol
//! - `Delegate` is the member resolution contract between layers
//! - `StateMachineHost` and `Component` attach machines to host objects
//! - `SharedStateMachine` serializes access across threads

mod config;
mod delegate;
mod host;
mod shared;
mod state_machine;

pub use config::{
    unique_names, ConfigValidation, ConfigViolation, MachineConfig,
    DEFAULT_MAXIMUM_TRANSITION_HISTORY_SIZE,
};
pub(crate) use config::violations;
pub use delegate::{CallContext, Delegate, TransitionRequest};
pub use host::{Component, StateMachineHost};
pub use shared::SharedStateMachine;
pub use state_machine::{Observer, StateMachine};
