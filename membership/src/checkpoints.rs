//! Time-indexed value history.
//!
//! A delegate's voting power (and the total credential supply) is stored as a
//! list of `(timestamp, value)` checkpoints appended on every change. Reading
//! the value at a past time is a binary search over the list: O(log k) where k
//! is the number of changes, independent of how much time has passed.

use cbank_types::Timestamp;
use serde::{Deserialize, Serialize};

/// One recorded value, effective from `at` until the next checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub at: Timestamp,
    pub value: u64,
}

/// Ordered checkpoint history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    entries: Vec<Checkpoint>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent value (0 if nothing was ever recorded).
    pub fn latest(&self) -> u64 {
        self.entries.last().map(|c| c.value).unwrap_or(0)
    }

    /// The value in effect at `at`: the last checkpoint with `checkpoint.at <= at`.
    pub fn value_at(&self, at: Timestamp) -> u64 {
        let idx = self.entries.partition_point(|c| c.at <= at);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].value
        }
    }

    /// Record `value` as of `at`.
    ///
    /// Several changes at the same timestamp collapse into one checkpoint.
    /// `at` must not precede the latest checkpoint; callers reject such writes.
    pub fn push(&mut self, at: Timestamp, value: u64) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.at <= at),
            "checkpoint at {at} precedes the latest checkpoint"
        );
        match self.entries.last_mut() {
            Some(last) if last.at == at => last.value = value,
            _ => self.entries.push(Checkpoint { at, value }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.entries.iter()
    }
}
