//! Per-case and per-suite run results.

use alertcheck_cases::{Description, MismatchError};
use serde::Serialize;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchRecord {
    /// Poll time (Unix millis).
    pub timestamp: i64,
    /// Milliseconds since zero time.
    pub elapsed_millis: i64,
    /// `alerts` or `metrics`.
    pub kind: String,
    /// Region the poll fell into.
    pub region: String,
    /// Every acceptable alternative, rendered.
    pub expected: Vec<String>,
    /// What the SUT returned, rendered.
    pub actual: String,
}

impl MismatchRecord {
    /// Records `error` observed at `timestamp`.
    #[must_use]
    pub fn new(timestamp: i64, error: MismatchError) -> Self {
        Self {
            timestamp,
            elapsed_millis: error.elapsed_millis,
            kind: error.kind.to_string(),
            region: error.region,
            expected: error.expected,
            actual: error.actual,
        }
    }
}

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Scenario title.
    pub name: String,
    /// Scenario description.
    pub description: String,
    /// Zero time of the run (Unix millis), if the case got that far.
    pub zero_time: Option<i64>,
    /// Completed polls.
    pub polls: u32,
    /// Every failed check, in poll order.
    pub mismatches: Vec<MismatchRecord>,
    /// The error that stopped the case early, if any.
    pub fatal: Option<String>,
}

impl CaseReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(description: &Description) -> Self {
        Self {
            name: description.title.clone(),
            description: description.description.clone(),
            zero_time: None,
            polls: 0,
            mismatches: Vec::new(),
            fatal: None,
        }
    }

    /// Creates a report for a case that failed before polling.
    #[must_use]
    pub fn aborted(description: &Description, reason: impl Into<String>) -> Self {
        Self {
            fatal: Some(reason.into()),
            ..Self::new(description)
        }
    }

    /// Returns true if every check passed and nothing stopped the case.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.fatal.is_none() && self.mismatches.is_empty()
    }

    /// Returns `"PASS"` or `"FAIL"`.
    #[must_use]
    pub fn verdict(&self) -> &'static str {
        if self.passed() { "PASS" } else { "FAIL" }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// One report per case, sorted by name.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Collects case reports, sorted by name.
    #[must_use]
    pub fn new(mut cases: Vec<CaseReport>) -> Self {
        cases.sort_by(|a, b| a.name.cmp(&b.name));
        Self { cases }
    }

    /// Returns true if every case passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    /// Returns the number of failed cases.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|c| !c.passed()).count()
    }

    /// Looks up a case report by name.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }
}
