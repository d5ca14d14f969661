//! Error types for pool operations.

use crate::block::Block;

/// Errors returned by pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The underlying span request failed or the block budget is exhausted.
    #[error("out of memory: could not provision {requested_bytes} bytes")]
    OutOfMemory {
        /// Size of the span that could not be provisioned.
        requested_bytes: usize,
    },

    /// The block handle was issued by a different pool.
    #[error("block does not belong to this pool")]
    ForeignBlock,

    /// A read or write reached past the end of the block.
    #[error("access of {len} bytes at offset {offset} exceeds block size {block_size}")]
    OutOfBounds {
        /// Requested start offset.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Size of the block.
        block_size: usize,
    },

    /// A poisoned free block was modified while on the free list.
    #[error("free block {index} was modified after release")]
    Corrupted {
        /// Index of the damaged block.
        index: usize,
    },

    /// A structural invariant of the pool does not hold.
    #[error("pool invariant violated: {0}")]
    InvariantViolation(String),

    /// Invalid pool or registry configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A rejected release. Carries the handle back so the block can still be
/// returned to the pool that issued it.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("release rejected: {error}")]
pub struct ReleaseError {
    /// Why the release was rejected.
    #[source]
    pub error: PoolError,
    /// The block that was not released.
    pub block: Block,
}

impl ReleaseError {
    /// Take the block handle back.
    pub fn into_block(self) -> Block {
        self.block
    }
}
