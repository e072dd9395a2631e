//! Core types shared by rule building, expectations and verification.
//!
//! - [`AlertState`]: The state tag the query API reports for an alert
//! - [`ComparisonOperator`]: Operators for threshold expressions
//! - [`AlertCondition`]: `<series> <op> <threshold>`
//! - [`ObservedAlert`] / [`ExpectedAlert`]: Alerts as reported and as predicted
//! - [`InstantSample`]: A labeled sample from an instant query
//! - [`ActiveSinceRange`]: Tolerated window for an alert's active-since time

use std::fmt;

use alertcheck_series::LabelSet;
use serde::{Deserialize, Serialize};

/// The state of an alert as reported by the SUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    /// The alert was active and its condition no longer holds.
    Inactive,
    /// The condition is true but hasn't been true long enough to fire.
    Pending,
    /// The condition has held for at least the rule's `for` duration.
    Firing,
}

impl AlertState {
    /// Returns the state as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Firing => "firing",
        }
    }

    /// Returns true if the alert is currently active (pending or firing).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Firing)
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison operators for alert conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Greater than (>).
    #[serde(rename = ">")]
    GreaterThan,
    /// Greater than or equal (>=).
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    /// Less than (<).
    #[serde(rename = "<")]
    LessThan,
    /// Less than or equal (<=).
    #[serde(rename = "<=")]
    LessThanOrEqual,
    /// Equal (==).
    #[serde(rename = "==")]
    Equal,
    /// Not equal (!=).
    #[serde(rename = "!=")]
    NotEqual,
}

impl ComparisonOperator {
    /// Returns the operator as a PromQL symbol.
    #[must_use]
    pub const fn as_symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_symbol())
    }
}

/// A threshold comparison against one series.
///
/// Renders as `<label set> <op> <threshold>`, e.g.
/// `{__name__="m", rulegroup="G"} > 10`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    /// The series the condition reads.
    pub selector: LabelSet,
    /// The comparison operator.
    pub operator: ComparisonOperator,
    /// The threshold value to compare against.
    pub threshold: f64,
}

impl AlertCondition {
    /// Creates a new condition.
    #[must_use]
    pub const fn new(selector: LabelSet, operator: ComparisonOperator, threshold: f64) -> Self {
        Self {
            selector,
            operator,
            threshold,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.selector, self.operator, self.threshold)
    }
}

/// A closed interval `[earliest, latest]` (Unix millis) bounding when an
/// alert may report it became active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSinceRange {
    /// Earliest acceptable timestamp (inclusive).
    pub earliest: i64,
    /// Latest acceptable timestamp (inclusive).
    pub latest: i64,
}

impl ActiveSinceRange {
    /// Creates a range. The bounds are swapped if given in reverse.
    #[must_use]
    pub const fn new(earliest: i64, latest: i64) -> Self {
        if earliest <= latest {
            Self { earliest, latest }
        } else {
            Self {
                earliest: latest,
                latest: earliest,
            }
        }
    }

    /// Checks if a timestamp lies in the range (both ends inclusive).
    #[must_use]
    pub const fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.earliest && timestamp <= self.latest
    }

    /// Width of the range in milliseconds.
    #[must_use]
    pub const fn width_millis(&self) -> i64 {
        self.latest - self.earliest
    }
}

impl fmt::Display for ActiveSinceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.earliest, self.latest)
    }
}

/// An alert as returned by the SUT's alert listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedAlert {
    /// Identifying labels.
    pub labels: LabelSet,
    /// Annotations.
    pub annotations: LabelSet,
    /// Reported state.
    pub state: AlertState,
    /// When the alert reports it became active (Unix millis).
    pub active_at: i64,
    /// The value, formatted by the SUT.
    pub value: String,
}

impl fmt::Display for ObservedAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} state={} value={} active_at={}",
            self.labels, self.annotations, self.state, self.value, self.active_at
        )
    }
}

/// An alert the model predicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedAlert {
    /// Identifying labels.
    pub labels: LabelSet,
    /// Annotations.
    pub annotations: LabelSet,
    /// Expected state.
    pub state: AlertState,
    /// Expected value, formatted.
    pub value: String,
}

impl ExpectedAlert {
    /// Checks labels, annotations, state and value against an observed alert.
    ///
    /// Values are compared numerically so `"11"` matches `"1.1e+01"`.
    #[must_use]
    #[allow(clippy::float_cmp)] // inputs are small integers
    pub fn matches(&self, observed: &ObservedAlert) -> bool {
        if self.labels != observed.labels
            || self.annotations != observed.annotations
            || self.state != observed.state
        {
            return false;
        }
        match (parse_value(&self.value), parse_value(&observed.value)) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl fmt::Display for ExpectedAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} state={} value={}",
            self.labels, self.annotations, self.state, self.value
        )
    }
}

/// Parses a SUT-formatted sample value, accepting the `+Inf`/`-Inf`/`NaN`
/// spellings used by Prometheus.
#[must_use]
pub fn parse_value(raw: &str) -> Option<f64> {
    match raw.trim() {
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}

/// A labeled sample from an instant query, used for both the expected and
/// the observed side of a metrics check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantSample {
    /// Series labels, including `__name__`.
    pub labels: LabelSet,
    /// Evaluation timestamp (Unix millis).
    pub timestamp: i64,
    /// Sample value.
    pub value: f64,
}

impl InstantSample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(labels: LabelSet, timestamp: i64, value: f64) -> Self {
        Self {
            labels,
            timestamp,
            value,
        }
    }
}

impl fmt::Display for InstantSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.labels, self.value, self.timestamp)
    }
}

/// The derived metric sample the model predicts.
pub type ExpectedSample = InstantSample;
