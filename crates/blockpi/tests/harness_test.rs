//! End-to-end tests for the harness module layer
//!
//! These tests drive module instances the way the load-test runner does:
//! declare counters during init, start the virtual users, then hit the
//! shared counters and the signer from many threads.

use std::thread;

use blockpi::{drill, HarnessConfig, HarnessError, RootModule, VirtualUser};
use blockpi_core::{recover_address, CounterRegistry, Error, PrivateKey};

const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

#[test]
fn test_vus_share_counters_declared_in_init() {
    const VUS: u64 = 8;
    const ITERATIONS: i64 = 500;

    let registry = CounterRegistry::new();
    let root = RootModule::with_registry(&registry);

    let users: Vec<_> = (1..=VUS)
        .map(|id| {
            let vu = VirtualUser::new(id);
            let instance = root.new_module_instance(&vu);
            let counter = instance.new_counter("tx_sent").unwrap();
            (vu, instance, counter)
        })
        .collect();

    thread::scope(|s| {
        for (vu, instance, counter) in &users {
            vu.start();
            s.spawn(move || {
                for _ in 0..ITERATIONS {
                    counter.add(1);
                }
                // Declaring state after init must fail
                assert!(matches!(
                    instance.new_counter("late"),
                    Err(HarnessError::Core(Error::Context(_)))
                ));
            });
        }
    });

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("tx_sent"), Some(VUS as i64 * ITERATIONS));
}

#[test]
fn test_signatures_from_module_recover_to_signer() {
    let registry = CounterRegistry::new();
    let root = RootModule::with_registry(&registry);
    let instance = root.new_module_instance(&VirtualUser::new(1));

    let expected = PrivateKey::from_hex(TEST_KEY).unwrap().address();
    for message in ["", "hello", "transfer 1 wei"] {
        let signature = instance.sign(TEST_KEY, message).unwrap();
        assert_eq!(signature.len(), 132);
        assert_eq!(recover_address(message, &signature).unwrap(), expected);
    }
}

#[test]
fn test_drill_on_global_registry() {
    let config = HarnessConfig {
        vus: 3,
        iterations: 20,
        counters: vec!["harness_test_tx".to_string()],
        verify_signatures: true,
        ..Default::default()
    };

    let report = drill::run(&config, TEST_KEY, RootModule::new()).unwrap();

    // Other tests may share the global registry, but not these names
    assert_eq!(report.counter("harness_test_tx"), Some(60));
    assert!(report.counter(drill::SIGNED).unwrap() >= 60);
    assert_eq!(report.counter(drill::MISMATCHED), Some(0));
}
