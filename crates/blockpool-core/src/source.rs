//! Span sources: where a pool gets the raw memory for its chunks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Provider of contiguous byte spans for chunk growth.
///
/// `provision` returns `None` when memory is unavailable; the pool turns that
/// into [`PoolError::OutOfMemory`](crate::error::PoolError::OutOfMemory).
/// Every span handed out is given back through `reclaim` exactly once, when
/// the owning pool is torn down.
pub trait SpanSource: Send + Sync {
    /// Request a zero-initialized span of exactly `bytes` bytes.
    fn provision(&self, bytes: usize) -> Option<Box<[u8]>>;

    /// Return a span previously obtained from `provision`.
    fn reclaim(&self, span: Box<[u8]>) {
        drop(span);
    }
}

impl<S: SpanSource + ?Sized> SpanSource for Arc<S> {
    fn provision(&self, bytes: usize) -> Option<Box<[u8]>> {
        (**self).provision(bytes)
    }

    fn reclaim(&self, span: Box<[u8]>) {
        (**self).reclaim(span);
    }
}

/// Span source backed by the global allocator.
///
/// Uses a fallible reservation so an allocation failure is reported to the
/// caller instead of aborting the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSource;

impl SpanSource for SystemSource {
    fn provision(&self, bytes: usize) -> Option<Box<[u8]>> {
        let mut span = Vec::new();
        span.try_reserve_exact(bytes).ok()?;
        span.resize(bytes, 0);
        Some(span.into_boxed_slice())
    }
}

/// Instrumented source that counts spans and can simulate exhaustion.
///
/// Wraps another source. After [`fail_after`](Self::fail_after) the given
/// number of successful provisions, every further request fails.
#[derive(Debug)]
pub struct CountingSource<S = SystemSource> {
    inner: S,
    provisioned: AtomicUsize,
    reclaimed: AtomicUsize,
    failures: AtomicUsize,
    remaining: AtomicUsize,
}

impl<S: SpanSource> CountingSource<S> {
    /// Wrap `inner` with unlimited provisioning.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            provisioned: AtomicUsize::new(0),
            reclaimed: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            remaining: AtomicUsize::new(usize::MAX),
        }
    }

    /// Allow `count` more successful provisions, then fail.
    pub fn fail_after(&self, count: usize) {
        self.remaining.store(count, Ordering::SeqCst);
    }

    /// Lift any provisioning limit.
    pub fn unlimited(&self) {
        self.remaining.store(usize::MAX, Ordering::SeqCst);
    }

    /// Number of spans handed out so far.
    pub fn provisioned(&self) -> usize {
        self.provisioned.load(Ordering::SeqCst)
    }

    /// Number of spans given back so far.
    pub fn reclaimed(&self) -> usize {
        self.reclaimed.load(Ordering::SeqCst)
    }

    /// Number of spans handed out and not yet given back.
    pub fn live(&self) -> usize {
        self.provisioned() - self.reclaimed()
    }

    /// Number of refused provision requests.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl Default for CountingSource {
    fn default() -> Self {
        Self::new(SystemSource)
    }
}

impl<S: SpanSource> SpanSource for CountingSource<S> {
    fn provision(&self, bytes: usize) -> Option<Box<[u8]>> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok();
        if !allowed {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return None;
        }
        let Some(span) = self.inner.provision(bytes) else {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return None;
        };
        self.provisioned.fetch_add(1, Ordering::SeqCst);
        Some(span)
    }

    fn reclaim(&self, span: Box<[u8]>) {
        self.reclaimed.fetch_add(1, Ordering::SeqCst);
        self.inner.reclaim(span);
    }
}
