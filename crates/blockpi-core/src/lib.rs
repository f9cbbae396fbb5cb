//! blockpi core - signing and counters for blockchain load tests
//!
//! This crate provides the two primitives the load-test harness exposes to
//! scripts: Keccak-256 + secp256k1 recoverable message signing, and a
//! process-wide registry of named atomic counters.

pub mod counter;
pub mod crypto;
pub mod error;
pub mod types;

pub use counter::{Counter, CounterHandle, CounterRegistry, Delta};
pub use crypto::{keccak256, recover_address, sign, PrivateKey};
pub use error::{Error, Result};
pub use types::{Address, MessageHash, PublicKey, RecoverableSignature, SIGNATURE_LEN};
