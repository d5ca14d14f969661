//! Constants for block layout and pool defaults.

/// Worst-case scalar alignment in bytes. Every block size is a multiple of it.
pub const WORST_CASE_ALIGN: usize = 16;

/// Bytes at the front of a free block that hold the link to the next free block.
pub const LINK_WORD_SIZE: usize = 8;

/// Pattern written over released blocks when poisoning is enabled.
pub const POISON_BYTE: u8 = 0xDD;

/// Default element size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Default number of blocks provisioned per chunk.
pub const DEFAULT_GROWTH_COUNT: usize = 16;

const _: () = assert!(WORST_CASE_ALIGN.is_power_of_two());
const _: () = assert!(LINK_WORD_SIZE <= WORST_CASE_ALIGN);
