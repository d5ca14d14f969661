//! Criterion benchmarks for pool acquire/release.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use blockpool_core::{Pool, PoolOptions};

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("AcquireRelease");
    for &size in &[16usize, 64, 256] {
        let pool = Pool::create(size, 64);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let block = pool.acquire().unwrap();
                pool.release(block).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_zeroed(c: &mut Criterion) {
    let pool = Pool::create(256, 64);
    c.bench_function("AcquireZeroed/256", |b| {
        b.iter(|| {
            let block = pool.acquire_zeroed().unwrap();
            pool.release(block).unwrap();
        });
    });
}

fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("Growth");
    for &growth in &[1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(growth), &growth, |b, &growth| {
            b.iter(|| {
                let pool = Pool::with_options(PoolOptions::new(64, growth));
                let blocks: Vec<_> = (0..256).map(|_| pool.acquire().unwrap()).collect();
                for block in blocks {
                    pool.release(block).unwrap();
                }
                pool.destroy()
            });
        });
    }
    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let pool = Arc::new(Pool::create(64, 64));
    c.bench_function("Contended/4threads", |b| {
        b.iter(|| {
            std::thread::scope(|s| {
                for _ in 0..4 {
                    let pool = Arc::clone(&pool);
                    s.spawn(move || {
                        for _ in 0..1_000 {
                            let block = pool.acquire().unwrap();
                            pool.release(block).unwrap();
                        }
                    });
                }
            });
        });
    });
}

criterion_group!(benches, bench_round_trip, bench_zeroed, bench_growth, bench_contended);
criterion_main!(benches);
