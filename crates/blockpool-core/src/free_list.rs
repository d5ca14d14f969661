//! Intrusive free list threaded through the link words of unused blocks.
//!
//! A free block stores `next_index + 1` as a little-endian `u64` in its first
//! [`LINK_WORD_SIZE`] bytes; `0` terminates the chain. The word is cleared when
//! the block leaves the list so callers never see it.

use crate::chunk::ChunkList;
use crate::constants::{LINK_WORD_SIZE, POISON_BYTE};

/// Read the link word of a free block.
pub(crate) fn read_link(block: &[u8]) -> Option<usize> {
    let mut word = [0u8; LINK_WORD_SIZE];
    word.copy_from_slice(&block[..LINK_WORD_SIZE]);
    match u64::from_le_bytes(word) {
        0 => None,
        encoded => usize::try_from(encoded - 1).ok(),
    }
}

/// Write the link word of a free block.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn write_link(block: &mut [u8], next: Option<usize>) {
    let encoded = next.map_or(0, |index| index as u64 + 1);
    block[..LINK_WORD_SIZE].copy_from_slice(&encoded.to_le_bytes());
}

/// Fill everything after the link word with the poison pattern.
pub(crate) fn poison(block: &mut [u8]) {
    block[LINK_WORD_SIZE..].fill(POISON_BYTE);
}

/// Check that nothing after the link word was touched since poisoning.
pub(crate) fn is_intact(block: &[u8]) -> bool {
    block[LINK_WORD_SIZE..].iter().all(|&b| b == POISON_BYTE)
}

/// Head of the chain of free blocks.
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    head: Option<usize>,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self { head: None }
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Make `index` the new head. Its link word must already point at the old chain.
    pub(crate) fn splice(&mut self, index: usize) {
        self.head = Some(index);
    }

    /// Push a block back onto the list. O(1).
    pub(crate) fn push(&mut self, chunks: &mut ChunkList, index: usize) {
        write_link(chunks.block_mut(index), self.head);
        self.head = Some(index);
    }

    /// Pop the head block, clearing its link word. O(1).
    pub(crate) fn pop(&mut self, chunks: &mut ChunkList) -> Option<usize> {
        let index = self.head?;
        let block = chunks.block_mut(index);
        self.head = read_link(block);
        write_link(block, None);
        Some(index)
    }

    pub(crate) fn clear(&mut self) {
        self.head = None;
    }
}
