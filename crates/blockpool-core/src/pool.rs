//! Fixed-block-size pool with lazy chunk growth.
//!
//! All state lives behind one `parking_lot::Mutex`. Acquire pops the head of
//! the free list, growing by one chunk first when the list is empty; release
//! pushes the block back. Both are O(1) apart from the occasional growth.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::block::Block;
use crate::chunk::ChunkList;
use crate::error::{PoolError, ReleaseError};
use crate::free_list::{is_intact, poison, read_link, FreeList};
use crate::options::PoolOptions;
use crate::source::{SpanSource, SystemSource};
use crate::stats::{Counters, PoolStats};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// What a teardown gave back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// Spans returned to the source.
    pub chunks_released: usize,
    /// Bytes returned to the source.
    pub bytes_released: usize,
    /// Blocks still held by callers at teardown; their handles are now dead.
    pub blocks_outstanding: usize,
}

struct PoolState {
    chunks: ChunkList,
    free: FreeList,
    counters: Counters,
}

impl PoolState {
    fn verify(&self, poisoned: bool) -> Result<(), PoolError> {
        let total = self.chunks.total_blocks();
        if self.counters.total != total {
            return Err(PoolError::InvariantViolation(format!(
                "total counter {} != {} blocks in {} chunks",
                self.counters.total,
                total,
                self.chunks.len()
            )));
        }
        if self.counters.available + self.counters.quarantined > total {
            return Err(PoolError::InvariantViolation(format!(
                "available {} plus quarantined {} exceeds total {total}",
                self.counters.available, self.counters.quarantined
            )));
        }

        let mut seen = vec![false; total];
        let mut reachable = 0;
        let mut cursor = self.free.head();
        while let Some(index) = cursor {
            if index >= total {
                return Err(PoolError::InvariantViolation(format!(
                    "free list links to block {index} outside {total} provisioned blocks"
                )));
            }
            if seen[index] {
                return Err(PoolError::InvariantViolation(format!(
                    "block {index} is on the free list twice"
                )));
            }
            seen[index] = true;
            reachable += 1;
            let block = self.chunks.block(index);
            if poisoned && !is_intact(block) {
                return Err(PoolError::Corrupted { index });
            }
            cursor = read_link(block);
        }

        if reachable != self.counters.available {
            return Err(PoolError::InvariantViolation(format!(
                "{reachable} blocks reachable but {} counted available",
                self.counters.available
            )));
        }
        Ok(())
    }
}

/// Thread-safe pool of fixed-size blocks.
///
/// Chunks of `growth_count` blocks are provisioned lazily on the first acquire
/// that finds the free list empty, and are only given back when the pool is
/// destroyed or dropped. Share a pool between threads with `Arc` or scoped
/// borrows.
pub struct Pool<S: SpanSource = SystemSource> {
    id: u64,
    block_size: usize,
    growth_count: usize,
    poisoned: bool,
    source: S,
    state: Mutex<PoolState>,
}

impl Pool {
    /// Create a pool for elements of `block_size` bytes, growing `growth_count`
    /// blocks at a time. No memory is provisioned until the first acquire.
    #[must_use]
    pub fn create(block_size: usize, growth_count: usize) -> Self {
        Self::with_options(PoolOptions::new(block_size, growth_count))
    }

    /// Create a pool from options, backed by the global allocator.
    #[must_use]
    pub fn with_options(options: PoolOptions) -> Self {
        Self::with_source(options, SystemSource)
    }
}

impl<S: SpanSource> Pool<S> {
    /// Create a pool that provisions its chunks from `source`.
    pub fn with_source(options: PoolOptions, source: S) -> Self {
        let options = options.normalize();
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            pool = id,
            block_size = options.block_size,
            growth_count = options.growth_count,
            "created pool"
        );
        Self {
            id,
            block_size: options.block_size,
            growth_count: options.growth_count,
            poisoned: options.poison,
            source,
            state: Mutex::new(PoolState {
                chunks: ChunkList::new(options.block_size, options.growth_count, options.max_blocks),
                free: FreeList::new(),
                counters: Counters::new(SystemTime::now()),
            }),
        }
    }

    /// Unique identifier of this pool.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Aligned size of one block in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Blocks provisioned per chunk.
    pub fn growth_count(&self) -> usize {
        self.growth_count
    }

    /// Whether released blocks are poisoned and checked before reuse.
    pub fn is_poisoning(&self) -> bool {
        self.poisoned
    }

    /// Take a block. Its contents are unspecified.
    ///
    /// Grows the pool by one chunk if no block is free. Fails with
    /// [`PoolError::OutOfMemory`] if that growth fails; never waits.
    pub fn acquire(&self) -> Result<Block, PoolError> {
        let mut guard = self.state.lock();
        let index = self.pop_locked(&mut guard)?;
        Ok(Block::new(self.id, index))
    }

    /// Take a block whose bytes are all zero.
    pub fn acquire_zeroed(&self) -> Result<Block, PoolError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let index = self.pop_locked(state)?;
        state.chunks.block_mut(index).fill(0);
        Ok(Block::new(self.id, index))
    }

    fn pop_locked(&self, state: &mut PoolState) -> Result<usize, PoolError> {
        let now = SystemTime::now();
        if state.free.is_empty() {
            if let Err(err) = state
                .chunks
                .grow(&self.source, &mut state.free, self.poisoned)
            {
                state.counters.record_failure(now);
                warn!(pool = self.id, chunks = state.chunks.len(), %err, "pool growth failed");
                return Err(err);
            }
            state.counters.record_growth(self.growth_count);
            debug!(
                pool = self.id,
                chunk = state.chunks.len(),
                blocks = self.growth_count,
                bytes = self.growth_count * self.block_size,
                "provisioned chunk"
            );
        }

        let Some(index) = state.free.head() else {
            return Err(PoolError::InvariantViolation(
                "free list empty after growth".into(),
            ));
        };
        if self.poisoned && !is_intact(state.chunks.block(index)) {
            state.free.pop(&mut state.chunks);
            state.counters.record_quarantine(now);
            error!(pool = self.id, block = index, "free block modified after release, quarantined");
            return Err(PoolError::Corrupted { index });
        }

        state.free.pop(&mut state.chunks);
        state.counters.record_acquire(now);
        Ok(index)
    }

    /// Give a block back to the pool.
    ///
    /// A block issued by another pool is rejected with
    /// [`PoolError::ForeignBlock`]; this pool is left untouched and the
    /// handle comes back inside the [`ReleaseError`].
    pub fn release(&self, block: Block) -> Result<(), ReleaseError> {
        if let Err(error) = self.check_owner(&block) {
            return Err(ReleaseError { error, block });
        }
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let index = block.index();
        if !state.chunks.contains(index) {
            return Err(ReleaseError {
                error: PoolError::ForeignBlock,
                block,
            });
        }
        if self.poisoned {
            poison(state.chunks.block_mut(index));
        }
        state.free.push(&mut state.chunks, index);
        state.counters.record_release(SystemTime::now());
        Ok(())
    }

    fn check_owner(&self, block: &Block) -> Result<(), PoolError> {
        if block.pool_id() == self.id {
            Ok(())
        } else {
            Err(PoolError::ForeignBlock)
        }
    }

    fn check_range(&self, block: &Block, offset: usize, len: usize) -> Result<(), PoolError> {
        self.check_owner(block)?;
        match offset.checked_add(len) {
            Some(end) if end <= self.block_size => Ok(()),
            _ => Err(PoolError::OutOfBounds {
                offset,
                len,
                block_size: self.block_size,
            }),
        }
    }

    /// Copy `data` into the block starting at `offset`.
    pub fn write(&self, block: &mut Block, offset: usize, data: &[u8]) -> Result<(), PoolError> {
        self.check_range(block, offset, data.len())?;
        let mut state = self.state.lock();
        state.chunks.block_mut(block.index())[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy bytes from the block starting at `offset` into `buf`.
    pub fn read(&self, block: &Block, offset: usize, buf: &mut [u8]) -> Result<(), PoolError> {
        self.check_range(block, offset, buf.len())?;
        let state = self.state.lock();
        buf.copy_from_slice(&state.chunks.block(block.index())[offset..offset + buf.len()]);
        Ok(())
    }

    /// Set every byte of the block to `byte`.
    pub fn fill(&self, block: &mut Block, byte: u8) -> Result<(), PoolError> {
        self.check_owner(block)?;
        self.state.lock().chunks.block_mut(block.index()).fill(byte);
        Ok(())
    }

    /// Copy the whole block out.
    pub fn to_vec(&self, block: &Block) -> Result<Vec<u8>, PoolError> {
        self.check_owner(block)?;
        Ok(self.state.lock().chunks.block(block.index()).to_vec())
    }

    /// Blocks currently on the free list.
    pub fn available(&self) -> usize {
        self.state.lock().counters.available
    }

    /// Blocks provisioned so far.
    pub fn total(&self) -> usize {
        self.state.lock().counters.total
    }

    /// Blocks currently held by callers.
    pub fn in_use(&self) -> usize {
        self.state.lock().counters.in_use()
    }

    /// Chunks provisioned so far.
    pub fn chunk_count(&self) -> usize {
        self.state.lock().chunks.len()
    }

    /// Time of the most recent acquire or release attempt.
    pub fn last_used(&self) -> SystemTime {
        self.state.lock().counters.last_used
    }

    /// Snapshot every counter under one lock acquisition.
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let counters = &state.counters;
        PoolStats {
            block_size: self.block_size,
            growth_count: self.growth_count,
            available: counters.available,
            total: counters.total,
            in_use: counters.in_use(),
            quarantined: counters.quarantined,
            chunks: state.chunks.len(),
            acquires: counters.acquires,
            releases: counters.releases,
            failed_acquires: counters.failed_acquires,
            last_used: counters.last_used,
        }
    }

    /// Walk the free list and check every structural invariant.
    ///
    /// O(total blocks); meant for tests and diagnostics.
    pub fn verify(&self) -> Result<(), PoolError> {
        self.state.lock().verify(self.poisoned)
    }

    /// Tear the pool down, returning every span to its source.
    ///
    /// Blocks still held by callers become invalid; that is a caller error
    /// and is only reported, not prevented.
    pub fn destroy(mut self) -> TeardownReport {
        let report = self.teardown();
        if report.blocks_outstanding > 0 {
            warn!(
                pool = self.id,
                outstanding = report.blocks_outstanding,
                "pool destroyed with blocks still allocated"
            );
        }
        info!(
            pool = self.id,
            chunks = report.chunks_released,
            bytes = report.bytes_released,
            "pool destroyed"
        );
        report
    }

    fn teardown(&mut self) -> TeardownReport {
        let state = self.state.get_mut();
        let blocks_outstanding = state.counters.in_use();
        let (chunks_released, bytes_released) = state.chunks.release_all(&self.source);
        state.free.clear();
        state.counters.available = 0;
        state.counters.total = 0;
        TeardownReport {
            chunks_released,
            bytes_released,
            blocks_outstanding,
        }
    }
}

impl<S: SpanSource> Drop for Pool<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: SpanSource> std::fmt::Debug for Pool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("block_size", &self.block_size)
            .field("growth_count", &self.growth_count)
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}
