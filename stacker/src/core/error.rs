//! Error types for stacking operations.

use polars::prelude::PolarsError;

/// Result type for stacking operations
pub type StackResult<T> = Result<T, StackError>;

/// Error type for stacking operations
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("Invalid band: {0}")]
    InvalidBand(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Insufficient data: bin at MJD {bin_mjd} has {epochs} epochs")]
    InsufficientData { bin_mjd: f64, epochs: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StackError {
    /// Whether this error only means a bin produced no point.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, StackError::InsufficientData { .. })
    }
}
