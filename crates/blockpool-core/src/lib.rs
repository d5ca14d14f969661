//! # blockpool-core
//!
//! Thread-safe fixed-block-size memory pool with lazy chunk growth.
//!
//! A [`Pool`] hands out fixed-size blocks carved from chunks of
//! `growth_count` blocks. Chunks are provisioned from a [`SpanSource`] only
//! when the free list runs dry and are returned together when the pool is
//! destroyed. Acquire and release are O(1) under a single lock.
//!
//! ```text
//!   chunks:  [ b0 | b1 | b2 | b3 ]  [ b4 | b5 | b6 | b7 ]
//!   free:    head -> b5 -> b6 -> b7 -> b2 -> (end)
//! ```
//!
//! Blocks are addressed by index rather than by pointer; a free block stores
//! the index of its successor in its first word.
#![warn(missing_docs)]

pub mod align;
pub mod block;
mod chunk;
pub mod constants;
pub mod error;
mod free_list;
pub mod options;
pub mod pool;
pub mod registry;
pub mod source;
pub mod stats;

pub use block::Block;
pub use error::{PoolError, ReleaseError};
pub use options::PoolOptions;
pub use pool::{Pool, TeardownReport};
pub use registry::PoolRegistry;
pub use source::{CountingSource, SpanSource, SystemSource};
pub use stats::PoolStats;
