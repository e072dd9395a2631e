//! Error types for the alertcheck-series crate.

use thiserror::Error;

/// Errors that can occur while building series data.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// The metric name is invalid (empty or contains invalid characters).
    #[error("invalid metric name: {reason}")]
    InvalidMetricName {
        /// The reason the name is invalid.
        reason: String,
    },

    /// A label name is invalid.
    #[error("invalid label name '{name}': {reason}")]
    InvalidLabelName {
        /// The offending label name.
        name: String,
        /// The reason the name is invalid.
        reason: String,
    },
}

/// Result type for series operations.
pub type Result<T> = std::result::Result<T, SeriesError>;
