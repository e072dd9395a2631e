//! An alert that goes pending, fires, resolves and stays resolved.
//!
//! The input series holds 11 (above the threshold of 10) from 2m to 8m and 9
//! afterwards. With a 3m `for` clause the alert is pending from 2m, firing from
//! 5m and resolved from 8m15s, the first 15s step carrying a 9.

use std::time::Duration;

use alertcheck_series::{LabelSet, Timeline};

use crate::case::{alerts_series_labels, Description, TestCase, RULE_GROUP_LABEL};
use crate::error::Result;
use crate::model::{AlertPhase, Alternative, Expectation, Tolerance, Transition, WindowPlan};
use crate::rule::{AlertingRule, RuleGroup};
use crate::types::{
    ActiveSinceRange, AlertCondition, AlertState, ComparisonOperator, ExpectedAlert, InstantSample,
};

use super::base_labels;

const GROUP: &str = "PendingAndFiringAndResolved";
const INTERVAL: Duration = Duration::from_secs(30);
const FOR: Duration = Duration::from_secs(3 * 60);
const STEP: Duration = Duration::from_secs(15);
const THRESHOLD: f64 = 10.0;
const ABOVE: f64 = 11.0;
const BELOW: f64 = 9.0;

/// Pending at 2m, firing at 5m, resolved at 8m15s, polled until 26m.
#[derive(Debug, Clone)]
pub struct PendingAndFiringAndResolved {
    alert: String,
    series: LabelSet,
}

impl PendingAndFiringAndResolved {
    /// Creates the scenario.
    #[must_use]
    pub fn new() -> Self {
        let alert = format!("{GROUP}_SimpleAlert");
        let series = base_labels(GROUP, &alert);
        Self { alert, series }
    }

    fn alert_labels(&self) -> LabelSet {
        LabelSet::from_pairs([
            ("alertname", self.alert.as_str()),
            ("foo", "bar"),
            (RULE_GROUP_LABEL, GROUP),
        ])
    }

    fn annotations() -> LabelSet {
        LabelSet::from_pairs([("description", "SimpleAlert is firing")])
    }

    fn plan() -> Result<WindowPlan> {
        WindowPlan::new(
            AlertPhase::Inactive,
            &[
                Transition::new(Duration::from_secs(2 * 60), AlertPhase::Pending),
                Transition::new(Duration::from_secs(5 * 60), AlertPhase::Firing),
                Transition::new(Duration::from_secs(8 * 60 + 15), AlertPhase::Resolved),
            ],
            Tolerance::for_interval(INTERVAL),
            Duration::from_secs(26 * 60),
        )
    }

    fn alternative(
        &self,
        phase: AlertPhase,
        ts: i64,
        active_since: Option<ActiveSinceRange>,
    ) -> Alternative {
        let (state, value) = match phase {
            AlertPhase::Inactive => return Alternative::empty(phase),
            AlertPhase::Pending => (AlertState::Pending, ABOVE),
            AlertPhase::Firing => (AlertState::Firing, ABOVE),
            AlertPhase::Resolved => (AlertState::Inactive, BELOW),
        };

        let labels = self.alert_labels();
        let sample_labels = alerts_series_labels(&labels, state.as_str());
        Alternative {
            phase,
            alerts: vec![ExpectedAlert {
                labels,
                annotations: Self::annotations(),
                state,
                value: value.to_string(),
            }],
            active_since,
            samples: vec![InstantSample::new(sample_labels, ts, value)],
        }
    }
}

impl Default for PendingAndFiringAndResolved {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCase for PendingAndFiringAndResolved {
    fn describe(&self) -> Description {
        Description::new(
            GROUP,
            "An alert goes from pending to firing to resolved state and stays in resolved state",
        )
    }

    fn group_name(&self) -> &str {
        GROUP
    }

    fn rule_group(&self) -> Result<RuleGroup> {
        let condition =
            AlertCondition::new(self.series.clone(), ComparisonOperator::GreaterThan, THRESHOLD);
        let rule = AlertingRule::builder(self.alert.as_str(), condition)
            .for_duration(FOR)
            .label("foo", "bar")
            .label(RULE_GROUP_LABEL, GROUP)
            .annotation("description", "SimpleAlert is firing")
            .build()?;
        RuleGroup::new(GROUP, INTERVAL, vec![rule])
    }

    fn timeline(&self) -> Timeline {
        Timeline::builder(self.series.clone(), STEP)
            // 0s..1m45s: below threshold, 3 at zero time
            .values([3.0, 5.0, 5.0, 5.0, 9.0, 9.0, 9.0, 9.0])
            // 2m..8m: above threshold
            .then(ABOVE)
            .repeat(ABOVE, 24)
            // 8m15s..29m: below threshold
            .repeat(BELOW, 84)
            .build()
    }

    fn test_duration(&self) -> Duration {
        Duration::from_secs(26 * 60)
    }

    fn expectation(&self, zero_time: i64, ts: i64) -> Result<Expectation> {
        let plan = Self::plan()?;
        let active_since = plan.active_since(zero_time);
        Ok(plan.expectation(ts - zero_time, |phase| {
            self.alternative(phase, ts, active_since)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::ArmedCase;
    use crate::model::Region;
    use crate::types::ObservedAlert;
    use std::sync::Arc;

    const ZERO: i64 = 1_700_000_000_000;

    fn armed() -> ArmedCase {
        ArmedCase::init(Arc::new(PendingAndFiringAndResolved::new()), ZERO)
    }

    fn at(secs: i64) -> i64 {
        ZERO + secs * 1000
    }

    fn observed(state: AlertState, value: &str, active_at: i64) -> ObservedAlert {
        let case = PendingAndFiringAndResolved::new();
        ObservedAlert {
            labels: case.alert_labels(),
            annotations: PendingAndFiringAndResolved::annotations(),
            state,
            active_at,
            value: value.to_string(),
        }
    }

    fn sample(state: &str, ts: i64, value: f64) -> InstantSample {
        let case = PendingAndFiringAndResolved::new();
        InstantSample::new(alerts_series_labels(&case.alert_labels(), state), ts, value)
    }

    mod rule_tests {
        use super::*;

        #[test]
        fn rule_group_shape() {
            let group = PendingAndFiringAndResolved::new().rule_group().unwrap();
            assert_eq!(group.name, "PendingAndFiringAndResolved");
            assert_eq!(group.interval, Duration::from_secs(30));
            assert_eq!(group.rules.len(), 1);

            let rule = &group.rules[0];
            assert_eq!(rule.alert, "PendingAndFiringAndResolved_SimpleAlert");
            assert_eq!(rule.for_duration, Duration::from_secs(180));
            assert_eq!(
                rule.expr(),
                concat!(
                    r#"{__name__="alert_generator_test_suite", "#,
                    r#"alertname="PendingAndFiringAndResolved_SimpleAlert", "#,
                    r#"rulegroup="PendingAndFiringAndResolved"} > 10"#
                )
            );
            assert_eq!(rule.labels.get("foo"), Some("bar"));
            assert_eq!(rule.labels.get("rulegroup"), Some("PendingAndFiringAndResolved"));
        }

        #[test]
        fn rule_document_encodes() {
            let doc = PendingAndFiringAndResolved::new()
                .rule_group()
                .unwrap()
                .to_document()
                .unwrap();
            assert!(doc.contains(r#""for": "3m""#));
            assert!(doc.contains(r#""interval": "30s""#));
        }
    }

    mod timeline_tests {
        use super::*;

        #[test]
        fn timeline_shape() {
            let timeline = PendingAndFiringAndResolved::new().timeline();
            assert_eq!(timeline.len(), 117);
            assert_eq!(timeline.step(), Duration::from_secs(15));
            assert_eq!(timeline.last_offset_millis(), Some(116 * 15_000));
        }

        #[test_case::test_case(0, 3.0 ; "zero")]
        #[test_case::test_case(105_000, 9.0 ; "last low before pending")]
        #[test_case::test_case(120_000, 11.0 ; "first high")]
        #[test_case::test_case(480_000, 11.0 ; "last high")]
        #[test_case::test_case(495_000, 9.0 ; "first low after firing")]
        #[test_case::test_case(1_560_000, 9.0 ; "horizon")]
        fn values_over_time(elapsed: i64, expected: f64) {
            let timeline = PendingAndFiringAndResolved::new().timeline();
            assert_eq!(timeline.value_at(elapsed), Some(expected));
        }
    }

    mod expectation_tests {
        use super::*;

        #[test_case::test_case(0, &[AlertPhase::Inactive] ; "start")]
        #[test_case::test_case(200, &[AlertPhase::Pending] ; "pending")]
        #[test_case::test_case(400, &[AlertPhase::Firing] ; "firing")]
        #[test_case::test_case(500, &[AlertPhase::Firing, AlertPhase::Resolved] ; "resolving")]
        #[test_case::test_case(1500, &[AlertPhase::Resolved] ; "resolved")]
        fn alternatives_at(secs: i64, phases: &[AlertPhase]) {
            let expectation = armed().expectation(at(secs)).unwrap();
            let got: Vec<AlertPhase> = expectation.alternatives.iter().map(|a| a.phase).collect();
            assert_eq!(got, phases);
        }

        #[test]
        fn start_expects_nothing() {
            let case = armed();
            let expectation = case.expectation(at(0)).unwrap();
            assert_eq!(expectation.region, Region::Firm(AlertPhase::Inactive));
            assert!(expectation.alternatives[0].alerts.is_empty());
            assert!(expectation.alternatives[0].samples.is_empty());
            assert!(case.check_alerts(at(0), &[]).is_ok());
            assert!(case.check_metrics(at(0), &[]).is_ok());
        }

        #[test]
        fn active_since_range_follows_zero_time() {
            let expectation = armed().expectation(at(200)).unwrap();
            assert_eq!(
                expectation.alternatives[0].active_since,
                Some(ActiveSinceRange::new(at(120), at(150)))
            );
        }

        #[test]
        fn past_horizon_expects_nothing_acceptable() {
            let case = armed();
            assert!(case.expectation(case.test_until()).unwrap().alternatives.is_empty());
            assert!(case.check_alerts(case.test_until(), &[]).unwrap_err().is_mismatch());
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn pending_alert_accepted_while_pending() {
            let case = armed();
            let ts = at(200);
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Pending, "11", at(135))])
                .is_ok());
            assert!(case.check_metrics(ts, &[sample("pending", ts, 11.0)]).is_ok());
        }

        #[test]
        fn firing_rejected_while_pending() {
            let case = armed();
            let ts = at(200);
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Firing, "11", at(135))])
                .is_err());
            assert!(case.check_metrics(ts, &[sample("firing", ts, 11.0)]).is_err());
        }

        #[test]
        fn active_since_outside_range_rejected() {
            let case = armed();
            let ts = at(400);
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Firing, "11", at(151))])
                .is_err());
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Firing, "11", at(150))])
                .is_ok());
        }

        #[test]
        fn either_side_accepted_while_resolving() {
            let case = armed();
            let ts = at(500);
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Firing, "11", at(140))])
                .is_ok());
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Inactive, "9", at(140))])
                .is_ok());
            assert!(case.check_metrics(ts, &[sample("firing", ts, 11.0)]).is_ok());
            assert!(case.check_metrics(ts, &[sample("inactive", ts, 9.0)]).is_ok());
            assert!(case.check_alerts(ts, &[]).is_err());
        }

        #[test]
        fn resolved_alert_reported_as_inactive() {
            let case = armed();
            let ts = at(1500);
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Inactive, "9", at(120))])
                .is_ok());
            assert!(case
                .check_alerts(ts, &[observed(AlertState::Firing, "11", at(120))])
                .is_err());
        }

        #[test]
        fn extra_alert_rejected() {
            let case = armed();
            let ts = at(400);
            let mut extra = observed(AlertState::Firing, "11", at(130));
            extra.labels.insert("instance", "other");
            let err = case
                .check_alerts(ts, &[observed(AlertState::Firing, "11", at(130)), extra])
                .unwrap_err();
            assert!(err.is_mismatch());
        }

        #[test]
        fn checks_are_idempotent() {
            let case = armed();
            let ts = at(310);
            let alerts = [observed(AlertState::Firing, "11", at(125))];
            let first = case.check_alerts(ts, &alerts).is_ok();
            let second = case.check_alerts(ts, &alerts).is_ok();
            assert!(first);
            assert_eq!(first, second);

            let samples = [sample("pending", ts, 11.0)];
            assert_eq!(
                case.check_metrics(ts, &samples).is_ok(),
                case.check_metrics(ts, &samples).is_ok()
            );
        }

        #[test]
        fn other_groups_are_not_owned() {
            let case = armed();
            let mut foreign = observed(AlertState::Firing, "11", at(130));
            foreign.labels.insert("rulegroup", "Other");
            assert!(case.owns_alert(&observed(AlertState::Firing, "11", at(130))));
            assert!(!case.owns_alert(&foreign));
        }
    }
}
