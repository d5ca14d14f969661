//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use clap::Parser;

use blockpool_core::{PoolError, PoolOptions};

use crate::workload::WorkloadSpec;

/// blockpool — stress a fixed-block memory pool from several threads.
#[derive(Parser, Debug)]
#[command(name = "blockpool", version, about)]
pub struct AppConfig {
    /// Element size in bytes (rounded up to the 16-byte alignment).
    #[arg(short, long, default_value = "64", env = "BLOCKPOOL_BLOCK_SIZE")]
    pub block_size: usize,

    /// Blocks provisioned per chunk.
    #[arg(short, long, default_value = "16", env = "BLOCKPOOL_GROWTH")]
    pub growth: usize,

    /// Number of worker threads.
    #[arg(short, long, default_value = "4", env = "BLOCKPOOL_THREADS")]
    pub threads: usize,

    /// Acquire/release cycles per thread.
    #[arg(short = 'n', long, default_value = "10000")]
    pub cycles: usize,

    /// Blocks each thread holds at once per cycle.
    #[arg(long, default_value = "1")]
    pub hold: usize,

    /// Maximum blocks the pool may provision (0 = unlimited).
    #[arg(long, default_value = "0")]
    pub max_blocks: usize,

    /// Poison released blocks and verify them before reuse.
    #[arg(long)]
    pub poison: bool,

    /// Acquire zero-filled blocks.
    #[arg(long)]
    pub zeroed: bool,

    /// Load pool options from a JSON file instead of the size flags.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Verbose output (debug logging).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only print failures).
    #[arg(short, long)]
    pub quiet: bool,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Pool options described by the size flags.
    #[must_use]
    pub fn flag_options(&self) -> PoolOptions {
        let mut opts = PoolOptions::new(self.block_size, self.growth).with_poison(self.poison);
        if self.max_blocks > 0 {
            opts = opts.with_max_blocks(self.max_blocks);
        }
        opts
    }

    /// Pool options: the JSON file when given, otherwise the flags.
    ///
    /// `--poison` is honoured in both cases.
    pub fn pool_options(&self) -> anyhow::Result<PoolOptions> {
        let Some(path) = &self.options else {
            return Ok(self.flag_options());
        };
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
        let mut opts = PoolOptions::from_json(&json)?;
        opts.poison |= self.poison;
        Ok(opts)
    }

    /// Workload shape described by the flags.
    pub fn workload(&self) -> Result<WorkloadSpec, PoolError> {
        if self.threads == 0 {
            return Err(PoolError::Config("--threads must be at least 1".into()));
        }
        Ok(WorkloadSpec {
            threads: self.threads,
            cycles: self.cycles,
            hold: self.hold.max(1),
            zeroed: self.zeroed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(std::iter::once("blockpool").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        let opts = config.flag_options();
        assert_eq!(opts.block_size, 64);
        assert_eq!(opts.growth_count, 16);
        assert_eq!(opts.max_blocks, None);
        assert!(!opts.poison);
        let spec = config.workload().unwrap();
        assert_eq!(spec.threads, 4);
        assert_eq!(spec.cycles, 10_000);
        assert_eq!(spec.hold, 1);
    }

    #[test]
    fn max_blocks_zero_means_unlimited() {
        let config = parse(&["--max-blocks", "32", "--poison"]);
        let opts = config.flag_options();
        assert_eq!(opts.max_blocks, Some(32));
        assert!(opts.poison);
    }

    #[test]
    fn zero_threads_rejected() {
        let config = parse(&["--threads", "0"]);
        assert!(matches!(config.workload(), Err(PoolError::Config(_))));
    }

    #[test]
    fn options_file_overrides_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"block_size": 128, "growth_count": 2}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let config = parse(&["--options", path.as_str(), "--block-size", "8", "--poison"]);
        let opts = config.pool_options().unwrap();
        assert_eq!(opts.block_size, 128);
        assert_eq!(opts.growth_count, 2);
        assert!(opts.poison);
    }

    #[test]
    fn missing_options_file_is_an_error() {
        let config = parse(&["--options", "/nonexistent/blockpool.json"]);
        assert!(config.pool_options().is_err());
    }
}
