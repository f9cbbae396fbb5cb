//! Error types for the blockpi harness

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that can occur in the harness
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Core library error
    #[error(transparent)]
    Core(#[from] blockpi_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A virtual user thread panicked
    #[error("Virtual user {0} panicked")]
    VuPanicked(u64),
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        HarnessError::Serialization(e.to_string())
    }
}
