//! Bounded transition history.
//!
//! The machine appends a snapshot of every committed transition when
//! history is enabled. Vetoed and failed transitions never appear here.

use super::transition::Transition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Immutable record of one committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    transition: Transition,
    recorded_at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Snapshot a transition, stamping it with the current time.
    pub fn new(transition: Transition) -> Self {
        Self::at(transition, Utc::now())
    }

    pub fn at(transition: Transition, recorded_at: DateTime<Utc>) -> Self {
        Self {
            transition,
            recorded_at,
        }
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn from(&self) -> Option<&str> {
        self.transition.from()
    }

    pub fn to(&self) -> Option<&str> {
        self.transition.to()
    }
}

/// Ordered, bounded log of transition records.
///
/// Iteration is most recent first. When appending would exceed the
/// maximum size, the oldest record is evicted. A maximum of `None`
/// keeps everything.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Transition, TransitionHistory, TransitionRecord};
///
/// let mut history = TransitionHistory::with_maximum_size(Some(2));
/// for to in ["a", "b", "c"] {
///     let transition = Transition::detached(Default::default()).to_state(to);
///     history.append(TransitionRecord::new(transition));
/// }
///
/// assert_eq!(history.count(), 2);
/// let newest_first: Vec<_> = history.iter().filter_map(|r| r.to()).collect();
/// assert_eq!(newest_first, vec!["c", "b"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    // Oldest at the front, newest at the back.
    records: VecDeque<TransitionRecord>,
    maximum_size: Option<usize>,
}

impl TransitionHistory {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maximum_size(maximum_size: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            maximum_size,
        }
    }

    pub fn maximum_size(&self) -> Option<usize> {
        self.maximum_size
    }

    /// Change the bound. Shrinking evicts the oldest records right away.
    pub fn set_maximum_size(&mut self, maximum_size: Option<usize>) {
        self.maximum_size = maximum_size;
        self.evict();
    }

    /// Add a record as the newest entry, evicting the oldest beyond the bound.
    pub fn append(&mut self, record: TransitionRecord) {
        self.records.push_back(record);
        self.evict();
    }

    fn evict(&mut self) {
        if let Some(max) = self.maximum_size {
            while self.records.len() > max {
                self.records.pop_front();
            }
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records, most recent first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TransitionRecord> + '_ {
        self.records.iter().rev()
    }

    /// Records, most recent first.
    pub fn to_vec(&self) -> Vec<TransitionRecord> {
        self.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn oldest(&self) -> Option<&TransitionRecord> {
        self.records.front()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// State names traversed, oldest first.
    ///
    /// Starts with the `from` of the oldest retained record (when it had one),
    /// followed by the `to` of every record.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(from) = self.oldest().and_then(|record| record.from()) {
            path.push(from);
        }
        path.extend(self.records.iter().filter_map(|record| record.to()));
        path
    }

    /// Time between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.oldest()?, self.latest()?);
        last.recorded_at
            .signed_duration_since(first.recorded_at)
            .to_std()
            .ok()
    }
}

impl<'a> IntoIterator for &'a TransitionHistory {
    type Item = &'a TransitionRecord;
    type IntoIter = std::iter::Rev<std::collections::vec_deque::Iter<'a, TransitionRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().rev()
    }
}
