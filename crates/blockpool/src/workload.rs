//! Multi-threaded acquire/release workload with canary checks.
//!
//! Every worker repeatedly acquires `hold` blocks, stamps each with a canary
//! unique to (worker, cycle, slot), reads the canaries back and releases the
//! blocks. A canary mismatch means two holders shared a block.

use std::time::{Duration, Instant};

use serde::Serialize;

use blockpool_core::{Block, Pool, PoolError, SpanSource};

/// Bytes of canary written at the start of each held block.
pub const CANARY_LEN: usize = 16;

/// Shape of a workload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    /// Worker threads.
    pub threads: usize,
    /// Cycles per worker.
    pub cycles: usize,
    /// Blocks held at once per cycle.
    pub hold: usize,
    /// Use zero-filled acquisition and check the fill.
    pub zeroed: bool,
}

/// Outcome of one worker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerReport {
    /// Worker index.
    pub worker: usize,
    /// Cycles completed.
    pub cycles: usize,
    /// Blocks acquired.
    pub acquired: u64,
    /// Canary or zero-fill mismatches observed.
    pub canary_failures: u64,
    /// Acquisitions refused for lack of memory.
    pub out_of_memory: u64,
    /// First error that stopped the worker, if any.
    pub error: Option<String>,
    #[serde(skip)]
    first_error: Option<PoolError>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    /// Per-worker results, ordered by worker index.
    pub workers: Vec<WorkerReport>,
    /// Wall-clock duration.
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

#[allow(clippy::cast_precision_loss)]
fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1_000.0)
}

impl WorkloadReport {
    /// Blocks acquired by all workers.
    pub fn acquired(&self) -> u64 {
        self.workers.iter().map(|w| w.acquired).sum()
    }

    /// Canary mismatches across all workers.
    pub fn canary_failures(&self) -> u64 {
        self.workers.iter().map(|w| w.canary_failures).sum()
    }

    /// Out-of-memory refusals across all workers.
    pub fn out_of_memory(&self) -> u64 {
        self.workers.iter().map(|w| w.out_of_memory).sum()
    }

    /// First pool error reported by any worker.
    pub fn first_error(&self) -> Option<&PoolError> {
        self.workers.iter().find_map(|w| w.first_error.as_ref())
    }

    /// Acquire+release pairs per second.
    #[allow(clippy::cast_precision_loss)]
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.acquired() as f64 / secs
        }
    }
}

/// Canary bytes for a (worker, cycle, slot) triple.
#[allow(clippy::cast_possible_truncation)]
pub fn canary(worker: usize, cycle: usize, slot: usize) -> [u8; CANARY_LEN] {
    let mut bytes = [0u8; CANARY_LEN];
    bytes[..4].copy_from_slice(&(worker as u32).to_le_bytes());
    bytes[4..12].copy_from_slice(&(cycle as u64).to_le_bytes());
    bytes[12..].copy_from_slice(&(slot as u32).to_le_bytes());
    bytes
}

/// Run `spec` against `pool`, one scoped thread per worker.
pub fn run<S: SpanSource>(pool: &Pool<S>, spec: &WorkloadSpec) -> WorkloadReport {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerReport>();
    let start = Instant::now();

    std::thread::scope(|scope| {
        for worker in 0..spec.threads {
            let tx = tx.clone();
            scope.spawn(move || {
                let report = run_worker(pool, spec, worker);
                tx.send(report).expect("report receiver alive");
            });
        }
    });
    drop(tx);

    let duration = start.elapsed();
    let mut workers: Vec<WorkerReport> = rx.iter().collect();
    workers.sort_by_key(|w| w.worker);
    WorkloadReport { workers, duration }
}

fn run_worker<S: SpanSource>(pool: &Pool<S>, spec: &WorkloadSpec, worker: usize) -> WorkerReport {
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };
    let mut held: Vec<Block> = Vec::with_capacity(spec.hold);

    for cycle in 0..spec.cycles {
        let outcome = run_cycle(pool, spec, worker, cycle, &mut held, &mut report);
        for block in held.drain(..) {
            if let Err(rejected) = pool.release(block) {
                report.fail(rejected.error);
            }
        }
        if let Err(err) = outcome {
            if matches!(err, PoolError::OutOfMemory { .. }) {
                report.out_of_memory += 1;
            }
            report.fail(err);
        }
        if report.first_error.is_some() {
            break;
        }
        report.cycles += 1;
    }
    report
}

fn run_cycle<S: SpanSource>(
    pool: &Pool<S>,
    spec: &WorkloadSpec,
    worker: usize,
    cycle: usize,
    held: &mut Vec<Block>,
    report: &mut WorkerReport,
) -> Result<(), PoolError> {
    for slot in 0..spec.hold {
        let mut block = if spec.zeroed {
            pool.acquire_zeroed()?
        } else {
            pool.acquire()?
        };
        report.acquired += 1;
        if spec.zeroed && pool.to_vec(&block)?.iter().any(|&b| b != 0) {
            report.canary_failures += 1;
        }
        pool.write(&mut block, 0, &canary(worker, cycle, slot))?;
        held.push(block);
    }

    let mut buf = [0u8; CANARY_LEN];
    for (slot, block) in held.iter().enumerate() {
        pool.read(block, 0, &mut buf)?;
        if buf != canary(worker, cycle, slot) {
            report.canary_failures += 1;
        }
    }
    Ok(())
}

impl WorkerReport {
    fn fail(&mut self, err: PoolError) {
        if self.first_error.is_none() {
            self.error = Some(err.to_string());
            self.first_error = Some(err);
        }
    }
}
