//! Error types for the alertcheck-cases crate.

use thiserror::Error;

/// An observed SUT response that matched none of the acceptable alternatives.
///
/// Mismatches are recorded per poll and never abort a run on their own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{kind} mismatch at +{elapsed_millis}ms ({region}): expected one of [{}], got {actual}",
    .expected.join(" | ")
)]
pub struct MismatchError {
    /// What was compared (`alerts` or `metrics`).
    pub kind: &'static str,
    /// Milliseconds since zero time.
    pub elapsed_millis: i64,
    /// Name of the state region the poll fell into.
    pub region: String,
    /// Each acceptable alternative, rendered.
    pub expected: Vec<String>,
    /// The observed set, rendered.
    pub actual: String,
}

/// Errors that can occur while building or checking a test case.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The rule group or state model could not be built.
    #[error("construction failed: {reason}")]
    Construction {
        /// The reason construction failed.
        reason: String,
    },

    /// The SUT's response was not in the acceptable set.
    #[error(transparent)]
    Mismatch(#[from] MismatchError),

    /// No case is registered under the given name.
    #[error("unknown test case: {name}")]
    UnknownCase {
        /// The requested name.
        name: String,
    },

    /// A case with the same name is already registered.
    #[error("duplicate test case: {name}")]
    DuplicateCase {
        /// The duplicated name.
        name: String,
    },

    /// Series data was invalid.
    #[error("series error: {0}")]
    Series(#[from] alertcheck_series::SeriesError),
}

impl CaseError {
    /// Shorthand for a construction error.
    pub fn construction(reason: impl Into<String>) -> Self {
        Self::Construction {
            reason: reason.into(),
        }
    }

    /// Returns true if this error is a state mismatch rather than a hard failure.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch(_))
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Construction {
            reason: format!("rule encoding failed: {err}"),
        }
    }
}

/// Result type for case operations.
pub type Result<T> = std::result::Result<T, CaseError>;
