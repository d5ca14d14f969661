//! Lock-guarded usage counters and their snapshot type.

use std::time::SystemTime;

use serde::Serialize;

/// Counters kept inside the pool state; only touched with the pool lock held.
#[derive(Debug, Clone)]
pub(crate) struct Counters {
    pub(crate) available: usize,
    pub(crate) total: usize,
    pub(crate) quarantined: usize,
    pub(crate) acquires: u64,
    pub(crate) releases: u64,
    pub(crate) failed_acquires: u64,
    pub(crate) last_used: SystemTime,
}

impl Counters {
    pub(crate) fn new(now: SystemTime) -> Self {
        Self {
            available: 0,
            total: 0,
            quarantined: 0,
            acquires: 0,
            releases: 0,
            failed_acquires: 0,
            last_used: now,
        }
    }

    pub(crate) fn in_use(&self) -> usize {
        self.total - self.available - self.quarantined
    }

    pub(crate) fn record_growth(&mut self, blocks: usize) {
        self.available += blocks;
        self.total += blocks;
    }

    pub(crate) fn record_acquire(&mut self, now: SystemTime) {
        self.available -= 1;
        self.acquires += 1;
        self.last_used = now;
    }

    pub(crate) fn record_release(&mut self, now: SystemTime) {
        self.available += 1;
        self.releases += 1;
        self.last_used = now;
    }

    pub(crate) fn record_failure(&mut self, now: SystemTime) {
        self.failed_acquires += 1;
        self.last_used = now;
    }

    /// A corrupted block was unlinked from the free list and is never reused.
    pub(crate) fn record_quarantine(&mut self, now: SystemTime) {
        self.available -= 1;
        self.quarantined += 1;
        self.record_failure(now);
    }
}

/// Point-in-time view of a pool's usage.
///
/// Diagnostic only: by the time a caller reads it another thread may have
/// changed the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Aligned size of one block in bytes.
    pub block_size: usize,
    /// Blocks provisioned per chunk.
    pub growth_count: usize,
    /// Blocks currently on the free list.
    pub available: usize,
    /// Blocks provisioned over the pool's lifetime.
    pub total: usize,
    /// Blocks currently held by callers.
    pub in_use: usize,
    /// Blocks found modified while free and withdrawn from use.
    pub quarantined: usize,
    /// Number of chunks provisioned.
    pub chunks: usize,
    /// Successful acquisitions.
    pub acquires: u64,
    /// Releases.
    pub releases: u64,
    /// Acquisitions that failed.
    pub failed_acquires: u64,
    /// Time of the most recent acquire or release attempt.
    pub last_used: SystemTime,
}

impl PoolStats {
    /// Fraction of provisioned blocks held by callers, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.in_use as f64 / self.total as f64
        }
    }

    /// Bytes of span memory held by the pool.
    #[must_use]
    pub fn footprint_bytes(&self) -> usize {
        self.total * self.block_size
    }
}
