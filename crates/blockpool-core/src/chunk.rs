//! Chunk manager: owns every span a pool has provisioned.
//!
//! Blocks are addressed by a global index. Block `i` lives in span
//! `i / growth_count` at byte offset `(i % growth_count) * block_size`.
//! Spans are only ever appended, so an index stays valid until teardown.

use crate::error::PoolError;
use crate::free_list::{poison, write_link, FreeList};
use crate::source::SpanSource;

/// Ordered collection of spans, each holding `growth_count` blocks.
#[derive(Debug)]
pub(crate) struct ChunkList {
    block_size: usize,
    growth_count: usize,
    max_blocks: Option<usize>,
    spans: Vec<Box<[u8]>>,
}

impl ChunkList {
    pub(crate) fn new(block_size: usize, growth_count: usize, max_blocks: Option<usize>) -> Self {
        debug_assert!(block_size > 0 && growth_count > 0);
        Self {
            block_size,
            growth_count,
            max_blocks,
            spans: Vec::new(),
        }
    }

    /// Number of spans provisioned.
    pub(crate) fn len(&self) -> usize {
        self.spans.len()
    }

    /// Number of blocks across all spans.
    pub(crate) fn total_blocks(&self) -> usize {
        self.spans.len() * self.growth_count
    }

    /// Size of one span in bytes, or `None` if it does not fit in `usize`.
    pub(crate) fn span_bytes(&self) -> Option<usize> {
        self.growth_count.checked_mul(self.block_size)
    }

    pub(crate) fn contains(&self, index: usize) -> bool {
        index < self.total_blocks()
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        let chunk = index / self.growth_count;
        let offset = (index % self.growth_count) * self.block_size;
        (chunk, offset)
    }

    /// Bytes of block `index`. The index must be in range.
    pub(crate) fn block(&self, index: usize) -> &[u8] {
        let (chunk, offset) = self.locate(index);
        &self.spans[chunk][offset..offset + self.block_size]
    }

    /// Mutable bytes of block `index`. The index must be in range.
    pub(crate) fn block_mut(&mut self, index: usize) -> &mut [u8] {
        let (chunk, offset) = self.locate(index);
        &mut self.spans[chunk][offset..offset + self.block_size]
    }

    /// Provision one more span, link its blocks and splice them onto `free`.
    ///
    /// On failure nothing is modified.
    pub(crate) fn grow<S: SpanSource + ?Sized>(
        &mut self,
        source: &S,
        free: &mut FreeList,
        poisoned: bool,
    ) -> Result<(), PoolError> {
        let span_bytes = self.span_bytes().ok_or(PoolError::OutOfMemory {
            requested_bytes: usize::MAX,
        })?;
        if let Some(limit) = self.max_blocks {
            if self.total_blocks().saturating_add(self.growth_count) > limit {
                return Err(PoolError::OutOfMemory {
                    requested_bytes: span_bytes,
                });
            }
        }

        let mut span = source.provision(span_bytes).ok_or(PoolError::OutOfMemory {
            requested_bytes: span_bytes,
        })?;
        if span.len() != span_bytes {
            source.reclaim(span);
            return Err(PoolError::OutOfMemory {
                requested_bytes: span_bytes,
            });
        }

        let first = self.total_blocks();
        let tail = free.head();
        for (slot, block) in span.chunks_exact_mut(self.block_size).enumerate() {
            if poisoned {
                poison(block);
            }
            let next = if slot + 1 < self.growth_count {
                Some(first + slot + 1)
            } else {
                tail
            };
            write_link(block, next);
        }

        self.spans.push(span);
        free.splice(first);
        Ok(())
    }

    /// Give every span back to `source`. Returns `(spans, bytes)` released.
    pub(crate) fn release_all<S: SpanSource + ?Sized>(&mut self, source: &S) -> (usize, usize) {
        let mut released = 0;
        let mut bytes = 0;
        for span in self.spans.drain(..) {
            released += 1;
            bytes += span.len();
            source.reclaim(span);
        }
        (released, bytes)
    }
}
