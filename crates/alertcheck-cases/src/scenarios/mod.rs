//! Built-in scenarios.

mod pending_firing_resolved;

use std::sync::Arc;

use alertcheck_series::{LabelSet, METRIC_NAME_LABEL};

use crate::case::{TestCase, RULE_GROUP_LABEL};

pub use pending_firing_resolved::PendingAndFiringAndResolved;

/// Metric name shared by every scenario's input series. Scenarios keep their
/// series apart through the `alertname` and `rulegroup` labels.
pub const TEST_METRIC: &str = "alert_generator_test_suite";

/// Labels of a scenario's input series.
#[must_use]
pub fn base_labels(group: &str, alert: &str) -> LabelSet {
    LabelSet::from_pairs([
        (METRIC_NAME_LABEL, TEST_METRIC),
        ("alertname", alert),
        (RULE_GROUP_LABEL, group),
    ])
}

/// Every built-in scenario.
#[must_use]
pub fn builtin() -> Vec<Arc<dyn TestCase>> {
    vec![Arc::new(PendingAndFiringAndResolved::new())]
}
