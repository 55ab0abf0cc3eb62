//! Reusable guard predicates.
//!
//! A guard decides whether a transition may proceed. States built with
//! [`StateBuilder`](crate::builder::StateBuilder) take guards for their
//! `before_enter` and `before_exit` hooks.

use super::transition::Transition;

/// Predicate over a transition. `true` lets it through.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Guard, Transition};
///
/// let guard = Guard::blocking_from("enabled");
///
/// let from_enabled = Transition::detached(Default::default())
///     .from_state("enabled")
///     .to_state("intermediate");
/// let from_disabled = Transition::detached(Default::default())
///     .from_state("disabled")
///     .to_state("intermediate");
///
/// assert!(!guard.check(&from_enabled));
/// assert!(guard.check(&from_disabled));
/// ```
pub struct Guard {
    predicate: Box<dyn Fn(&Transition) -> bool + Send + Sync>,
}

impl Guard {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Transition) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Reject transitions coming from the named state.
    pub fn blocking_from(state: impl Into<String>) -> Self {
        let state = state.into();
        Self::new(move |t| t.from() != Some(state.as_str()))
    }

    /// Accept only transitions coming from the named state.
    pub fn only_from(state: impl Into<String>) -> Self {
        let state = state.into();
        Self::new(move |t| t.from() == Some(state.as_str()))
    }

    /// Reject transitions heading to the named state.
    pub fn blocking_to(state: impl Into<String>) -> Self {
        let state = state.into();
        Self::new(move |t| t.to() != Some(state.as_str()))
    }

    pub fn check(&self, transition: &Transition) -> bool {
        (self.predicate)(transition)
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
