//! Concurrency tests for the counter registry
//!
//! Many threads race on get-or-create and add; the registry must hand out
//! a single counter per name and never lose an increment.

use std::sync::Barrier;
use std::thread;

use blockpi_core::{sign, CounterHandle, CounterRegistry};

const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

#[test]
fn test_three_callers_thousand_adds() {
    let registry = CounterRegistry::new();
    let counter = registry.get_or_create("tx_sent");

    thread::scope(|s| {
        for _ in 0..3 {
            let counter = counter.clone();
            s.spawn(move || {
                for _ in 0..1000 {
                    counter.add(1);
                }
            });
        }
    });

    assert_eq!(counter.get(), 3000);
}

#[test]
fn test_no_lost_updates_with_racing_creation() {
    const THREADS: usize = 16;
    const ADDS: i64 = 2_000;

    let registry = CounterRegistry::new();
    let barrier = Barrier::new(THREADS);

    let handles: Vec<CounterHandle> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    // Release every thread at once so first access is contended
                    barrier.wait();
                    let counter = registry.get_or_create("contended");
                    for _ in 0..ADDS {
                        counter.add(1);
                    }
                    counter
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(registry.len(), 1);
    assert!(handles.windows(2).all(|w| w[0].same_counter(&w[1])));
    assert_eq!(registry.get("contended"), Some(THREADS as i64 * ADDS));
}

#[test]
fn test_many_names_created_concurrently() {
    const THREADS: usize = 8;
    const NAMES: usize = 64;

    let registry = CounterRegistry::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                for i in 0..NAMES {
                    registry.get_or_create(&format!("name_{i}")).add(true);
                }
            });
        }
    });

    assert_eq!(registry.len(), NAMES);
    for (_, value) in registry.snapshot() {
        assert_eq!(value, THREADS as i64);
    }
}

#[test]
fn test_handles_observe_each_other_across_threads() {
    let registry = CounterRegistry::new();
    let writer = registry.get_or_create("shared");

    thread::scope(|s| {
        s.spawn(|| {
            writer.add(41);
        });
    });

    let reader = thread::scope(|s| s.spawn(|| registry.get_or_create("shared")).join().unwrap());
    assert_eq!(reader.add(true), 42);
    assert_eq!(writer.get(), 42);
}

#[test]
fn test_parallel_signing_is_consistent() {
    let expected = sign(TEST_KEY, "hello").unwrap();

    let results: Vec<String> = thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|_| s.spawn(|| sign(TEST_KEY, "hello").unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(results.iter().all(|sig| *sig == expected));
}
