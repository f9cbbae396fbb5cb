//! blockpi - load-test harness module for blockchain workloads
//!
//! This crate provides:
//! - The per-virtual-user module layer exposing `sign` and counters
//! - Harness configuration
//! - A local drill that exercises both primitives from many threads

pub mod config;
pub mod drill;
pub mod error;
pub mod module;

pub use config::HarnessConfig;
pub use drill::DrillReport;
pub use error::{HarnessError, Result};
pub use module::{ModuleInstance, RootModule, VirtualUser, VuPhase};
