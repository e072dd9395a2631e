//! Error types for the alertcheck driver.

use alertcheck_cases::CaseError;
use thiserror::Error;

/// Errors that can occur while driving a suite run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A call to the system under test failed or timed out.
    #[error("{operation} failed: {reason}")]
    Transport {
        /// The operation that failed (`remote write`, `list alerts`, ...).
        operation: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A scenario could not be built or checked.
    #[error(transparent)]
    Case(#[from] CaseError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Shorthand for a transport error.
    pub fn transport(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = DriverError::transport("list alerts", "connection refused");
        assert_eq!(err.to_string(), "list alerts failed: connection refused");
        assert!(err.is_transient());
    }

    #[test]
    fn config_error_display() {
        let err = DriverError::Config("poll interval is zero".to_string());
        assert_eq!(err.to_string(), "configuration error: poll interval is zero");
        assert!(!err.is_transient());
    }

    #[test]
    fn case_error_is_transparent() {
        let err: DriverError = CaseError::construction("bad rule").into();
        assert_eq!(err.to_string(), "construction failed: bad rule");
        assert!(!err.is_transient());
    }

    #[test]
    fn io_error_converts() {
        let err: DriverError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("io error:"));
    }
}
