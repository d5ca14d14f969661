#![no_main]

use libfuzzer_sys::fuzz_target;

use blockpool_core::{Block, Pool, PoolOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    // First bytes pick the pool shape; the rest is an op stream.
    let block_size = usize::from(data[0]);
    let growth = usize::from(data[1] % 16);
    let poison = data[2] & 1 == 1;
    let pool = Pool::with_options(
        PoolOptions::new(block_size, growth)
            .with_poison(poison)
            .with_max_blocks(512),
    );
    let mut held: Vec<Block> = Vec::new();

    for &op in &data[3..] {
        match op % 4 {
            0 => {
                if let Ok(block) = pool.acquire() {
                    held.push(block);
                }
            }
            1 => {
                if let Ok(block) = pool.acquire_zeroed() {
                    assert!(pool.to_vec(&block).unwrap().iter().all(|&b| b == 0));
                    held.push(block);
                }
            }
            2 => {
                if !held.is_empty() {
                    let block = held.swap_remove(usize::from(op) % held.len());
                    pool.release(block).unwrap();
                }
            }
            _ => {
                if let Some(block) = held.last_mut() {
                    let len = usize::from(op >> 2).min(pool.block_size());
                    pool.write(block, 0, &vec![op; len]).unwrap();
                }
            }
        }
        pool.verify().unwrap();
        let stats = pool.stats();
        assert!(stats.available <= stats.total);
        assert_eq!(stats.total, stats.chunks * pool.growth_count());
        assert_eq!(stats.in_use, held.len());
    }

    for block in held {
        pool.release(block).unwrap();
    }
    let report = pool.destroy();
    assert_eq!(report.blocks_outstanding, 0);
});
