//! Caller-side block handle.

/// Exclusive handle to one allocated block.
///
/// The handle records which pool issued it and the block's index within that
/// pool. It cannot be cloned or copied, so a block can be released only once.
/// Contents are accessed through the issuing [`Pool`](crate::pool::Pool).
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a block that is never released stays allocated until its pool is destroyed"]
pub struct Block {
    pool_id: u64,
    index: usize,
}

impl Block {
    pub(crate) const fn new(pool_id: u64, index: usize) -> Self {
        Self { pool_id, index }
    }

    /// Stable index of the block within its pool.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Identifier of the pool that issued this block.
    pub const fn pool_id(&self) -> u64 {
        self.pool_id
    }
}
