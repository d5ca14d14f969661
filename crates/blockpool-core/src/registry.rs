//! Named pools, one per record type.
//!
//! Subsystems register a pool per record type up front. Registration is cheap
//! because pools provision nothing until their first acquire.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::PoolError;
use crate::options::PoolOptions;
use crate::pool::Pool;
use crate::stats::PoolStats;

/// Registry of named pools.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<String, Arc<Pool>>>,
}

impl PoolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pool under `name`.
    ///
    /// Fails with [`PoolError::Config`] if the name is empty or taken.
    pub fn register(&self, name: &str, options: PoolOptions) -> Result<Arc<Pool>, PoolError> {
        if name.is_empty() {
            return Err(PoolError::Config("pool name must not be empty".into()));
        }
        let mut pools = self.pools.write();
        if pools.contains_key(name) {
            return Err(PoolError::Config(format!("pool already registered: {name}")));
        }
        let pool = Arc::new(Pool::with_options(options));
        info!(
            name,
            pool = pool.id(),
            block_size = pool.block_size(),
            growth_count = pool.growth_count(),
            "registered pool"
        );
        pools.insert(name.to_string(), Arc::clone(&pool));
        Ok(pool)
    }

    /// Look up a pool by name.
    pub fn get(&self, name: &str) -> Option<Arc<Pool>> {
        self.pools.read().get(name).cloned()
    }

    /// Remove a pool from the registry. The pool itself lives on while other
    /// `Arc`s to it exist.
    pub fn remove(&self, name: &str) -> Option<Arc<Pool>> {
        self.pools.write().remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Statistics for every registered pool, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, PoolStats)> {
        let pools: Vec<(String, Arc<Pool>)> = self
            .pools
            .read()
            .iter()
            .map(|(name, pool)| (name.clone(), Arc::clone(pool)))
            .collect();
        let mut stats: Vec<(String, PoolStats)> = pools
            .into_iter()
            .map(|(name, pool)| (name, pool.stats()))
            .collect();
        stats.sort_by(|a, b| a.0.cmp(&b.0));
        stats
    }

    /// Number of registered pools.
    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    /// Whether no pool is registered.
    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }
}
