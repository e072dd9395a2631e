//! The contract every scenario implements, and the armed form the driver polls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alertcheck_series::{LabelSet, TimeSeries, Timeline, METRIC_NAME_LABEL};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::Expectation;
use crate::rule::RuleGroup;
use crate::types::{InstantSample, ObservedAlert};
use crate::verify;

/// Label every scenario's rule attaches to its alerts so the driver can tell
/// cases apart in the SUT's global alert listing.
pub const RULE_GROUP_LABEL: &str = "rulegroup";

/// Metric the SUT derives from active alerts.
pub const ALERTS_METRIC: &str = "ALERTS";

/// A scenario's title and explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// Short unique name, also the registry key.
    pub title: String,
    /// What the scenario exercises.
    pub description: String,
}

impl Description {
    /// Creates a description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// A conformance scenario.
///
/// Implementations are plain data plus functions; nothing here is mutated
/// after construction. Time-dependent checks go through [`ArmedCase`].
pub trait TestCase: Send + Sync + fmt::Debug {
    /// Title and description.
    fn describe(&self) -> Description;

    /// Name of the scenario's rule group.
    fn group_name(&self) -> &str;

    /// The rule group the SUT must load.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if the group cannot be built.
    fn rule_group(&self) -> Result<RuleGroup>;

    /// The input series, relative to zero time.
    fn timeline(&self) -> Timeline;

    /// How long after zero time polling continues.
    fn test_duration(&self) -> Duration;

    /// Every acceptable SUT state at `ts`, for a run anchored at `zero_time`.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if the state model cannot be built.
    fn expectation(&self, zero_time: i64, ts: i64) -> Result<Expectation>;

    /// Instant query whose result feeds [`ArmedCase::check_metrics`].
    fn metrics_query(&self) -> String {
        let selector = LabelSet::from_pairs([(RULE_GROUP_LABEL, self.group_name())]);
        format!("{ALERTS_METRIC}{selector}")
    }
}

/// Labels for the derived `ALERTS` series of an alert in `state`.
#[must_use]
pub fn alerts_series_labels(alert_labels: &LabelSet, state: &str) -> LabelSet {
    alert_labels
        .clone()
        .with(METRIC_NAME_LABEL, ALERTS_METRIC)
        .with("alertstate", state)
}

/// A scenario bound to a zero time, ready to be polled.
///
/// Created once per run by [`ArmedCase::init`]; every elapsed-time computation
/// is relative to the zero time it captured.
#[derive(Debug, Clone)]
pub struct ArmedCase {
    case: Arc<dyn TestCase>,
    description: Description,
    zero_time: i64,
    test_until: i64,
}

impl ArmedCase {
    /// Binds `case` to `zero_time` (Unix millis).
    #[must_use]
    pub fn init(case: Arc<dyn TestCase>, zero_time: i64) -> Self {
        let description = case.describe();
        let duration = i64::try_from(case.test_duration().as_millis()).unwrap_or(i64::MAX);
        Self {
            case,
            description,
            zero_time,
            test_until: zero_time.saturating_add(duration),
        }
    }

    /// Returns the scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.description.title
    }

    /// Returns the scenario description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Returns the zero time (Unix millis).
    #[must_use]
    pub const fn zero_time(&self) -> i64 {
        self.zero_time
    }

    /// Returns the time after which polling stops (Unix millis).
    #[must_use]
    pub const fn test_until(&self) -> i64 {
        self.test_until
    }

    /// Returns the input series anchored at zero time.
    #[must_use]
    pub fn timeline_series(&self) -> TimeSeries {
        self.case.timeline().anchor(self.zero_time)
    }

    /// Returns the acceptable states at `ts`.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if the state model cannot be built.
    pub fn expectation(&self, ts: i64) -> Result<Expectation> {
        let expectation = self.case.expectation(self.zero_time, ts)?;
        debug!(
            case = %self.name(),
            elapsed_ms = expectation.elapsed_millis,
            region = %expectation.region,
            alternatives = expectation.alternatives.len(),
            "Computed expectation"
        );
        Ok(expectation)
    }

    /// Checks the alert listing observed at `ts`.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Mismatch` if the listing is not acceptable.
    pub fn check_alerts(&self, ts: i64, alerts: &[ObservedAlert]) -> Result<()> {
        let expectation = self.expectation(ts)?;
        verify::check_alerts(&expectation, alerts)?;
        Ok(())
    }

    /// Checks the derived-metric samples observed at `ts`.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Mismatch` if the samples are not acceptable.
    pub fn check_metrics(&self, ts: i64, samples: &[InstantSample]) -> Result<()> {
        let expectation = self.expectation(ts)?;
        verify::check_metrics(&expectation, samples)?;
        Ok(())
    }

    /// Returns the instant query for [`check_metrics`](Self::check_metrics).
    #[must_use]
    pub fn metrics_query(&self) -> String {
        self.case.metrics_query()
    }

    /// Returns true if `alert` was produced by this scenario's rule group.
    #[must_use]
    pub fn owns_alert(&self, alert: &ObservedAlert) -> bool {
        alert.labels.get(RULE_GROUP_LABEL) == Some(self.case.group_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertPhase, Alternative, Region};
    use crate::types::AlertState;

    #[derive(Debug)]
    struct Quiet;

    impl TestCase for Quiet {
        fn describe(&self) -> Description {
            Description::new("Quiet", "never alerts")
        }

        fn group_name(&self) -> &str {
            "quiet_group"
        }

        fn rule_group(&self) -> Result<RuleGroup> {
            Err(crate::error::CaseError::construction("not needed"))
        }

        fn timeline(&self) -> Timeline {
            Timeline::builder(LabelSet::from_pairs([("__name__", "q")]), Duration::from_secs(15))
                .repeat(1.0, 4)
                .build()
        }

        fn test_duration(&self) -> Duration {
            Duration::from_secs(60)
        }

        fn expectation(&self, zero_time: i64, ts: i64) -> Result<Expectation> {
            Ok(Expectation {
                elapsed_millis: ts - zero_time,
                region: Region::Firm(AlertPhase::Inactive),
                alternatives: vec![Alternative::empty(AlertPhase::Inactive)],
            })
        }
    }

    fn armed() -> ArmedCase {
        ArmedCase::init(Arc::new(Quiet), 1_000_000)
    }

    fn alert(group: &str) -> ObservedAlert {
        ObservedAlert {
            labels: LabelSet::from_pairs([("alertname", "X"), (RULE_GROUP_LABEL, group)]),
            annotations: LabelSet::new(),
            state: AlertState::Pending,
            active_at: 0,
            value: "1".to_string(),
        }
    }

    #[test]
    fn init_captures_zero_time_and_horizon() {
        let case = armed();
        assert_eq!(case.name(), "Quiet");
        assert_eq!(case.zero_time(), 1_000_000);
        assert_eq!(case.test_until(), 1_060_000);
    }

    #[test]
    fn timeline_is_anchored() {
        let series = armed().timeline_series();
        let stamps: Vec<i64> = series.samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![1_000_000, 1_015_000, 1_030_000, 1_045_000]);
    }

    #[test]
    fn default_metrics_query_selects_group() {
        assert_eq!(armed().metrics_query(), r#"ALERTS{rulegroup="quiet_group"}"#);
    }

    #[test]
    fn owns_only_its_group() {
        let case = armed();
        assert!(case.owns_alert(&alert("quiet_group")));
        assert!(!case.owns_alert(&alert("other_group")));
    }

    #[test]
    fn checks_delegate_to_expectation() {
        let case = armed();
        assert!(case.check_alerts(1_010_000, &[]).is_ok());
        assert!(case.check_metrics(1_010_000, &[]).is_ok());

        let err = case
            .check_alerts(1_010_000, &[alert("quiet_group")])
            .unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn alerts_series_labels_add_name_and_state() {
        let labels = alerts_series_labels(&LabelSet::from_pairs([("alertname", "A")]), "firing");
        assert_eq!(labels.metric_name(), Some("ALERTS"));
        assert_eq!(labels.get("alertstate"), Some("firing"));
        assert_eq!(labels.get("alertname"), Some("A"));
    }
}
