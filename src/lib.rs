//! Statecraft: a guarded finite state machine engine
//!
//! A machine holds a set of named states, at most one of which is current.
//! Moving between states follows a fixed protocol: the state being left and
//! the state being entered may each veto the move before it happens, and
//! both are notified after it has happened. Committed moves can be kept in
//! a bounded history.
//!
//! # Core Concepts
//!
//! - **State**: Named participant with lifecycle hooks via the `State` trait
//! - **Transition**: The request passed to every hook, with its parameters
//! - **History**: Most-recent-first record of committed transitions
//! - **Delegation**: Member access forwarded from host to machine to state
//!
//! # Example
//!
//! ```rust
//! use statecraft::builder::StateBuilder;
//! use statecraft::machine::Delegate;
//! use statecraft::{json, params, StateMachineBuilder};
//!
//! let mut machine = StateMachineBuilder::new()
//!     .state(
//!         StateBuilder::new("enabled")
//!             .member("isEnabled", json!(true))
//!             .method("disable", |_, ctx| {
//!                 ctx.transition("disabled", params! {});
//!                 Ok(json!(null))
//!             })
//!             .build(),
//!     )
//!     .state(StateBuilder::new("disabled").member("isEnabled", json!(false)).build())
//!     .default_state("enabled")
//!     .enable_history(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(machine.get_member("isEnabled"), Some(json!(true)));
//! machine.call_member("disable", &[]).unwrap();
//!
//! assert!(machine.is("disabled"));
//! assert_eq!(machine.transition_history().count(), 1);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod error;
pub mod machine;

// Re-export commonly used types
pub use builder::{StateBuilder, StateMachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{Guard, Params, State, StateBase, Transition, TransitionHistory};
pub use error::{HookError, HookResult, StateMachineError};
pub use machine::{Component, Delegate, SharedStateMachine, StateMachine};
pub use serde_json::{json, Value};
