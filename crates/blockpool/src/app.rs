//! Application entry point and dispatch.

use anyhow::Result;

use blockpool_core::{Pool, PoolError};

use crate::config::AppConfig;
use crate::presenter::{ReportPresenter, RunReport};
use crate::version::full_version;
use crate::workload;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    let options = config.pool_options()?;
    let spec = config.workload()?;

    let pool = Pool::with_options(options.clone());
    tracing::debug!(
        pool = pool.id(),
        poison = pool.is_poisoning(),
        threads = spec.threads,
        cycles = spec.cycles,
        hold = spec.hold,
        "starting workload"
    );
    let report = workload::run(&pool, &spec);

    let verification = pool.verify();
    if let Err(err) = &verification {
        tracing::error!(%err, "pool verification failed");
    }
    let stats = pool.stats();
    let teardown = pool.destroy();

    let run_report = RunReport {
        version: full_version(),
        options,
        stats,
        workload: report,
        teardown,
        verified: verification.is_ok(),
    };
    ReportPresenter::new(config.json, config.quiet)
        .present(&run_report, &mut std::io::stdout().lock())?;

    verification?;
    if let Some(err) = run_report.workload.first_error() {
        return Err(err.clone().into());
    }
    let failures = run_report.workload.canary_failures();
    if failures > 0 {
        return Err(PoolError::InvariantViolation(format!(
            "{failures} canary mismatches: a block was handed to two holders"
        ))
        .into());
    }
    Ok(())
}
