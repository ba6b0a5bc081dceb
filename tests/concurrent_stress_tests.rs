//! Concurrent stress test for the LFU cache.
//!
//! Many threads hammer a single shared cache with a randomized mix of
//! `put`/`get`/`delete`/`evict` over a small key space, then the structural
//! invariants are checked once the dust settles. The property under test is
//! linearizability of the single reader-writer lock, not any particular
//! eviction outcome - concurrent writers racing for the same keys makes the
//! final contents non-deterministic by design.

use cache_rs::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 5_000;
const KEY_SPACE: u64 = 1_000;
const CAPACITY: usize = 100;

/// A small, dependency-free xorshift PRNG so each thread gets its own
/// deterministic, non-contending stream of pseudo-random operations.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

#[test]
fn concurrent_hammer_preserves_invariants() {
    let cache: Arc<Cache<u64, u64>> = Arc::new(Cache::new(CAPACITY));
    let puts = Arc::new(AtomicU64::new(0));
    let gets = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            let puts = Arc::clone(&puts);
            let gets = Arc::clone(&gets);
            thread::spawn(move || {
                let mut rng = Rng(0x9E3779B9 ^ (thread_id as u64 + 1));
                for _ in 0..OPS_PER_THREAD {
                    let key = rng.next() % KEY_SPACE;
                    match rng.next() % 4 {
                        0 => {
                            let _ = cache.put(key, key, true);
                            puts.fetch_add(1, Ordering::Relaxed);
                        }
                        1 => {
                            cache.get(&key);
                            gets.fetch_add(1, Ordering::Relaxed);
                        }
                        2 => {
                            let _ = cache.delete(&key);
                        }
                        _ => {
                            cache.evict();
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(puts.load(Ordering::Relaxed) > 0);
    assert!(gets.load(Ordering::Relaxed) > 0);

    // P1: the index, the snapshot, and current_size must all agree.
    let snapshot = cache.as_slice();
    assert_eq!(snapshot.len(), cache.current_size());

    // P5: capacity was never exceeded.
    assert!(cache.current_size() <= CAPACITY);

    // Every value in the snapshot is the key it was stored under - `put`
    // with `replace = true` always writes `(key, key)`, so no torn or
    // foreign value could have leaked in from another key's slot.
    for (k, v) in &snapshot {
        assert_eq!(k, v);
    }

    // P2/P3: re-derive the invariants from the public inspection surface.
    // The least/top frequency buckets are always subsets of the full
    // snapshot and must not contain duplicate keys.
    let least = cache.get_least_frequency_items();
    let top = cache.get_top_frequency_items();
    let mut seen = std::collections::HashSet::new();
    for (k, _) in least.iter().chain(top.iter()) {
        assert!(seen.insert(*k) || least.len() == 1 || top.len() == 1 || least == top);
    }
}

#[test]
fn concurrent_puts_on_disjoint_keys_all_land() {
    let cache: Arc<Cache<u64, u64>> = Arc::new(Cache::new(NUM_THREADS * 10));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..10 {
                    let key = (thread_id * 10 + i) as u64;
                    cache.put(key, key, false).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.current_size(), NUM_THREADS * 10);
    for thread_id in 0..NUM_THREADS {
        for i in 0..10 {
            let key = (thread_id * 10 + i) as u64;
            assert_eq!(cache.get(&key), Some(key));
        }
    }
}
