//! Report formatting: human-readable text or JSON.

use std::io::{self, Write};

use serde::Serialize;

use blockpool_core::{PoolOptions, PoolStats, TeardownReport};

use crate::workload::WorkloadReport;

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Tool version.
    pub version: String,
    /// Options the pool was created with.
    pub options: PoolOptions,
    /// Pool statistics just before teardown.
    pub stats: PoolStats,
    /// Workload results.
    pub workload: WorkloadReport,
    /// What teardown gave back.
    pub teardown: TeardownReport,
    /// Whether the invariant check passed.
    pub verified: bool,
}

/// Presenter for run reports.
pub struct ReportPresenter {
    json: bool,
    quiet: bool,
}

impl ReportPresenter {
    /// Create a presenter.
    #[must_use]
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Write `report` to `out`.
    pub fn present(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
            return Ok(());
        }
        if self.quiet {
            return Ok(());
        }

        let stats = &report.stats;
        let workload = &report.workload;
        writeln!(out, "{}", report.version)?;
        writeln!(
            out,
            "Pool: block size {} B, growth {} blocks/chunk{}",
            stats.block_size,
            stats.growth_count,
            if report.options.poison { ", poisoning" } else { "" }
        )?;
        writeln!(
            out,
            "Workload: {} threads, {} acquisitions in {:.3?} ({:.0} ops/s)",
            workload.workers.len(),
            workload.acquired(),
            workload.duration,
            workload.ops_per_sec()
        )?;
        writeln!(
            out,
            "Blocks: {} total, {} available, {} in use ({:.1}% utilized), {} chunks ({} bytes)",
            stats.total,
            stats.available,
            stats.in_use,
            stats.utilization() * 100.0,
            stats.chunks,
            stats.footprint_bytes()
        )?;
        if stats.quarantined > 0 {
            writeln!(out, "Quarantined: {} corrupted blocks", stats.quarantined)?;
        }
        writeln!(
            out,
            "Counters: {} acquires, {} releases, {} failed",
            stats.acquires, stats.releases, stats.failed_acquires
        )?;
        writeln!(
            out,
            "Canary failures: {}, out of memory: {}",
            workload.canary_failures(),
            workload.out_of_memory()
        )?;
        writeln!(
            out,
            "Invariants: {}",
            if report.verified { "ok" } else { "VIOLATED" }
        )?;
        writeln!(
            out,
            "Teardown: {} chunks, {} bytes released",
            report.teardown.chunks_released, report.teardown.bytes_released
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blockpool_core::Pool;

    use super::*;
    use crate::workload::{run, WorkloadSpec};

    fn sample_report() -> RunReport {
        let options = PoolOptions::new(32, 4);
        let pool = Pool::with_options(options.clone());
        let workload = run(
            &pool,
            &WorkloadSpec {
                threads: 2,
                cycles: 10,
                hold: 1,
                zeroed: false,
            },
        );
        let stats = pool.stats();
        let teardown = pool.destroy();
        RunReport {
            version: "blockpool test".into(),
            options,
            stats,
            workload,
            teardown,
            verified: true,
        }
    }

    #[test]
    fn text_report_mentions_key_numbers() {
        let mut out = Vec::new();
        ReportPresenter::new(false, false)
            .present(&sample_report(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("block size 32 B"));
        assert!(text.contains("20 acquisitions"));
        assert!(text.contains("Invariants: ok"));
    }

    #[test]
    fn text_report_shows_utilization_and_quarantine() {
        let mut report = sample_report();
        report.stats.total = 8;
        report.stats.available = 5;
        report.stats.in_use = 2;
        report.stats.quarantined = 1;
        let mut out = Vec::new();
        ReportPresenter::new(false, false)
            .present(&report, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2 in use (25.0% utilized)"));
        assert!(text.contains("Quarantined: 1 corrupted blocks"));
    }

    #[test]
    fn json_report_parses() {
        let mut out = Vec::new();
        ReportPresenter::new(true, false)
            .present(&sample_report(), &mut out)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["stats"]["block_size"], 32);
        assert_eq!(value["teardown"]["blocks_outstanding"], 0);
        assert_eq!(value["workload"]["workers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn quiet_text_prints_nothing() {
        let mut report = sample_report();
        report.workload.duration = Duration::ZERO;
        let mut out = Vec::new();
        ReportPresenter::new(false, true)
            .present(&report, &mut out)
            .unwrap();
        assert!(out.is_empty());
    }
}
