//! CLI error types.

use alertcheck_cases::CaseError;
use alertcheck_driver::DriverError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A test case could not be resolved or built.
    #[error(transparent)]
    Case(#[from] CaseError),

    /// The driver failed.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
