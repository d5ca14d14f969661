//! Shared helpers for the workspace integration tests.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Records which block indices are held right now, across threads.
///
/// A `claim` that finds the index already present means the pool handed the
/// same block to two holders.
#[derive(Debug, Default)]
pub struct ClaimSet {
    held: Mutex<HashSet<usize>>,
}

impl ClaimSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `index` as held. Returns `false` if it already was.
    pub fn claim(&self, index: usize) -> bool {
        self.held.lock().insert(index)
    }

    /// Mark `index` as no longer held. Returns `false` if it was not held.
    pub fn unclaim(&self, index: usize) -> bool {
        self.held.lock().remove(&index)
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.held.lock().is_empty()
    }
}
