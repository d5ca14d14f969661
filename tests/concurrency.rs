//! Concurrent stress tests: no block is ever held by two threads at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use blockpool_core::{Pool, PoolOptions};
use blockpool_tests::ClaimSet;

const THREADS: usize = 8;
const CYCLES: usize = 10_000;

#[allow(clippy::cast_possible_truncation)]
fn canary(thread: usize, cycle: usize) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&(thread as u64).to_le_bytes());
    bytes[8..].copy_from_slice(&(cycle as u64).to_le_bytes());
    bytes
}

#[test]
fn stress_acquire_release_keeps_blocks_exclusive() {
    let pool = Arc::new(Pool::create(64, 16));
    let claims = Arc::new(ClaimSet::new());
    let conflicts = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|s| {
        for thread in 0..THREADS {
            let pool = Arc::clone(&pool);
            let claims = Arc::clone(&claims);
            let conflicts = Arc::clone(&conflicts);
            s.spawn(move || {
                let mut buf = [0u8; 16];
                for cycle in 0..CYCLES {
                    let mut block = pool.acquire().unwrap();
                    if !claims.claim(block.index()) {
                        conflicts.fetch_add(1, Ordering::SeqCst);
                    }
                    let expected = canary(thread, cycle);
                    pool.write(&mut block, 0, &expected).unwrap();
                    std::hint::spin_loop();
                    pool.read(&block, 0, &mut buf).unwrap();
                    if buf != expected {
                        conflicts.fetch_add(1, Ordering::SeqCst);
                    }
                    claims.unclaim(block.index());
                    pool.release(block).unwrap();
                }
            });
        }
    });

    assert_eq!(conflicts.load(Ordering::SeqCst), 0);
    assert!(claims.is_empty());
    assert_eq!(pool.available(), pool.total());
    assert_eq!(pool.total() % 16, 0);
    // Each thread holds at most one block, so one chunk always suffices.
    assert_eq!(pool.total(), 16);
    pool.verify().unwrap();
}

#[test]
fn concurrent_acquires_never_alias() {
    let pool = Pool::with_options(PoolOptions::new(32, 4));
    let claims = ClaimSet::new();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let held: Vec<_> = (0..5).map(|_| pool.acquire().unwrap()).collect();
                    for block in &held {
                        assert!(claims.claim(block.index()), "block {} aliased", block.index());
                    }
                    for block in held {
                        assert!(claims.unclaim(block.index()));
                        pool.release(block).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.total(), pool.chunk_count() * 4);
    pool.verify().unwrap();
}

#[test]
fn concurrent_growth_from_empty_pool() {
    let pool = Pool::create(16, 1);
    let per_thread = 50;

    let blocks: Vec<Vec<_>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    (0..per_thread)
                        .map(|_| pool.acquire().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut indices: Vec<usize> = blocks.iter().flatten().map(|b| b.index()).collect();
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices.len(), 4 * per_thread);
    assert_eq!(pool.total(), 4 * per_thread);
    assert_eq!(pool.available(), 0);

    for block in blocks.into_iter().flatten() {
        pool.release(block).unwrap();
    }
    assert_eq!(pool.available(), pool.total());
}

#[test]
fn stats_reads_race_with_mutation() {
    let pool = Pool::create(64, 8);
    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..5_000 {
                let block = pool.acquire().unwrap();
                pool.release(block).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..5_000 {
                let stats = pool.stats();
                assert!(stats.available <= stats.total);
                assert_eq!(stats.total, stats.chunks * 8);
            }
        });
    });
}
