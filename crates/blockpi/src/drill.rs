//! Local concurrency drill
//!
//! Runs the configured number of virtual users on OS threads. Each one
//! declares its counters during init, then signs the configured message
//! once per iteration and records the outcome in shared counters.

use std::thread;
use std::time::{Duration, Instant};

use blockpi_core::{recover_address, CounterHandle, PrivateKey};
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::module::{RootModule, VirtualUser};

/// Successful signatures
pub const SIGNED: &str = "signed";
/// Failed signing calls
pub const ERRORS: &str = "errors";
/// Signatures that did not recover to the signing key's address
pub const MISMATCHED: &str = "mismatched";

/// Outcome of a drill
#[derive(Debug, Clone)]
pub struct DrillReport {
    pub vus: u64,
    pub iterations: u64,
    pub elapsed: Duration,
    /// Registry contents after the drill, sorted by name
    pub counters: Vec<(String, i64)>,
}

impl DrillReport {
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Signatures per second over the whole drill
    pub fn throughput(&self) -> f64 {
        let signed = self.counter(SIGNED).unwrap_or(0) as f64;
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            signed / secs
        } else {
            0.0
        }
    }
}

struct VuCounters {
    signed: CounterHandle,
    errors: CounterHandle,
    mismatched: CounterHandle,
    extra: Vec<CounterHandle>,
}

/// Run the drill against `root`'s registry
pub fn run(
    config: &HarnessConfig,
    private_key_hex: &str,
    root: RootModule<'_>,
) -> Result<DrillReport> {
    config.validate()?;
    let expected = PrivateKey::from_hex(private_key_hex)?.address();

    // Init phase: every VU declares its counters before any iteration runs
    let mut users = Vec::with_capacity(config.vus as usize);
    for id in 1..=config.vus {
        let vu = VirtualUser::new(id);
        let instance = root.new_module_instance(&vu);
        let counters = VuCounters {
            signed: instance.new_counter(SIGNED)?,
            errors: instance.new_counter(ERRORS)?,
            mismatched: instance.new_counter(MISMATCHED)?,
            extra: config
                .counters
                .iter()
                .map(|name| instance.new_counter(name))
                .collect::<Result<_>>()?,
        };
        users.push((vu, instance, counters));
    }

    info!(
        vus = config.vus,
        iterations = config.iterations,
        signer = %expected,
        "starting drill"
    );

    let started = Instant::now();
    thread::scope(|s| {
        let workers: Vec<_> = users
            .iter()
            .map(|(vu, instance, counters)| {
                vu.start();
                let worker = s.spawn(move || {
                    for _ in 0..config.iterations {
                        match instance.sign(private_key_hex, &config.message) {
                            Ok(signature) => {
                                counters.signed.add(1);
                                if config.verify_signatures {
                                    let recovered = recover_address(&config.message, &signature);
                                    if !matches!(recovered, Ok(address) if address == expected) {
                                        counters.mismatched.add(true);
                                    }
                                }
                            }
                            Err(e) => {
                                counters.errors.add(true);
                                warn!(vu = vu.id(), error = %e, "signing failed");
                            }
                        }
                        for counter in &counters.extra {
                            counter.add(true);
                        }
                    }
                });
                (vu.id(), worker)
            })
            .collect();

        workers.into_iter().try_for_each(|(id, worker)| {
            worker.join().map_err(|_| HarnessError::VuPanicked(id))
        })
    })?;
    let elapsed = started.elapsed();

    let report = DrillReport {
        vus: config.vus,
        iterations: config.iterations,
        elapsed,
        counters: root.registry().snapshot(),
    };

    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        throughput = report.throughput(),
        "drill finished"
    );

    Ok(report)
}
