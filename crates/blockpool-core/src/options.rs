//! Pool configuration.

use serde::{Deserialize, Serialize};

use crate::align::adjust_to_worst_case;
use crate::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_GROWTH_COUNT};
use crate::error::PoolError;

/// Options for creating a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    /// Requested element size in bytes; rounded up to the worst-case alignment.
    pub block_size: usize,
    /// Blocks provisioned per chunk; 0 is treated as 1.
    pub growth_count: usize,
    /// Upper bound on provisioned blocks (`None` = unlimited).
    pub max_blocks: Option<usize>,
    /// Fill released blocks with a sentinel and verify it before reuse.
    pub poison: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            growth_count: DEFAULT_GROWTH_COUNT,
            max_blocks: None,
            poison: false,
        }
    }
}

impl PoolOptions {
    /// Options for the given element size and growth increment.
    #[must_use]
    pub fn new(block_size: usize, growth_count: usize) -> Self {
        Self {
            block_size,
            growth_count,
            ..Self::default()
        }
    }

    /// Cap the number of blocks the pool may provision.
    #[must_use]
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }

    /// Enable or disable release poisoning.
    #[must_use]
    pub fn with_poison(mut self, poison: bool) -> Self {
        self.poison = poison;
        self
    }

    /// Normalize options: align the block size and clamp the growth increment.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.block_size = adjust_to_worst_case(self.block_size);
        self.growth_count = self.growth_count.max(1);
        self
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        serde_json::from_str(json).map_err(|e| PoolError::Config(e.to_string()))
    }
}
