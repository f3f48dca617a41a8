//! Error handling for the growthviz pipeline.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

use crate::models::Sex;

pub mod util;

/// Errors raised while loading, deriving or exporting growth tables
#[derive(Debug, thiserror::Error)]
pub enum GrowthVizError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the Arrow CSV reader/writer or array kernels
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error writing Parquet output
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting records to or from a record batch
    #[error("Record conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// Error parsing a JSON configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input violates the expected schema or a structural invariant
    #[error("Data error in {context}: {message}")]
    Data {
        /// Where the problem was found (file, row, bucket)
        context: String,
        /// What is wrong
        message: String,
    },

    /// No reference moments for the requested sex and age-year
    #[error("No reference moments for sex {sex} at age {age}")]
    Lookup {
        /// Sex of the observation
        sex: Sex,
        /// Rounded age in years
        age: i64,
    },

    /// Zero height in a BMI denominator while zero heights are rejected
    #[error("Zero height in BMI denominator for {context}")]
    ArithmeticAmbiguity {
        /// The offending merged row
        context: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A table name was not registered
    #[error("Table '{0}' is not registered")]
    TableNotFound(String),
}

impl GrowthVizError {
    /// Create a data error with a location and a message
    pub fn data(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether the error is recoverable as a missing value
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

/// Result type for growthviz operations
pub type Result<T> = std::result::Result<T, GrowthVizError>;
