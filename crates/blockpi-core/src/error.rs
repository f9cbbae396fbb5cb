//! Error types for blockpi core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the signing service and the counter registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Private key is malformed or outside the curve order
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// The curve operation could not produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Counter construction attempted outside the init phase
    #[error("Context error: {0}")]
    Context(String),

    /// Signature is malformed or does not recover to a public key
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}
