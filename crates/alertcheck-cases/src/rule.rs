//! Alerting rule definitions in the SUT's rule-file shape.
//!
//! A scenario builds exactly one [`RuleGroup`]. The driver combines the groups
//! of every selected scenario into a [`RuleFile`] and hands its document to the
//! rule loader:
//!
//! ```text
//! {"groups":[{"name":"G","interval":"30s","rules":[{"alert":"A","expr":"...","for":"3m",...}]}]}
//! ```
//!
//! The document is JSON, which rule loaders that read YAML accept as-is.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use alertcheck_series::{LabelSet, MetricName};
use serde::{Serialize, Serializer};

use crate::case::TestCase;
use crate::error::{CaseError, Result};
use crate::types::AlertCondition;

/// Formats a duration the way Prometheus prints `model.Duration`
/// (`0s`, `30s`, `3m`, `1h5m`, `1w2d`, `250ms`).
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    const UNITS: [(&str, u128); 7] = [
        ("y", 365 * 24 * 60 * 60 * 1000),
        ("w", 7 * 24 * 60 * 60 * 1000),
        ("d", 24 * 60 * 60 * 1000),
        ("h", 60 * 60 * 1000),
        ("m", 60 * 1000),
        ("s", 1000),
        ("ms", 1),
    ];

    let mut millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in UNITS {
        if millis >= size {
            out.push_str(&(millis / size).to_string());
            out.push_str(unit);
            millis %= size;
        }
    }
    out
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*duration))
}

fn serialize_condition<S: Serializer>(
    condition: &AlertCondition,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(condition)
}

/// One alerting rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertingRule {
    /// Alert name; becomes the `alertname` label.
    pub alert: String,
    /// The threshold expression.
    #[serde(rename = "expr", serialize_with = "serialize_condition")]
    pub condition: AlertCondition,
    /// How long the condition must hold before the alert fires.
    #[serde(rename = "for", serialize_with = "serialize_duration")]
    pub for_duration: Duration,
    /// Extra labels attached to the alert.
    pub labels: LabelSet,
    /// Annotations attached to the alert.
    pub annotations: LabelSet,
}

impl AlertingRule {
    /// Creates a new rule builder.
    pub fn builder(alert: impl Into<String>, condition: AlertCondition) -> AlertingRuleBuilder {
        AlertingRuleBuilder::new(alert, condition)
    }

    /// Returns the expression as text.
    #[must_use]
    pub fn expr(&self) -> String {
        self.condition.to_string()
    }
}

/// Builder for [`AlertingRule`].
#[derive(Debug)]
pub struct AlertingRuleBuilder {
    alert: String,
    condition: AlertCondition,
    for_duration: Duration,
    labels: LabelSet,
    annotations: LabelSet,
}

impl AlertingRuleBuilder {
    fn new(alert: impl Into<String>, condition: AlertCondition) -> Self {
        Self {
            alert: alert.into(),
            condition,
            for_duration: Duration::ZERO,
            labels: LabelSet::new(),
            annotations: LabelSet::new(),
        }
    }

    /// Sets the duration the condition must hold before firing.
    #[must_use]
    pub const fn for_duration(mut self, duration: Duration) -> Self {
        self.for_duration = duration;
        self
    }

    /// Adds a label to the rule.
    #[must_use]
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key, value);
        self
    }

    /// Adds an annotation to the rule.
    #[must_use]
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key, value);
        self
    }

    /// Builds the [`AlertingRule`].
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if:
    /// - The alert name is not a valid metric name
    /// - A label or annotation name is invalid
    /// - The selector is invalid
    pub fn build(self) -> Result<AlertingRule> {
        MetricName::new(self.alert.as_str()).map_err(|e| {
            CaseError::construction(format!("alert name '{}': {e}", self.alert))
        })?;
        self.condition
            .selector
            .validate()
            .map_err(|e| CaseError::construction(format!("rule expression: {e}")))?;
        self.labels
            .validate()
            .map_err(|e| CaseError::construction(format!("rule labels: {e}")))?;
        self.annotations
            .validate()
            .map_err(|e| CaseError::construction(format!("rule annotations: {e}")))?;

        Ok(AlertingRule {
            alert: self.alert,
            condition: self.condition,
            for_duration: self.for_duration,
            labels: self.labels,
            annotations: self.annotations,
        })
    }
}

/// A named group of rules evaluated together on a fixed interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleGroup {
    /// Group name.
    pub name: String,
    /// Evaluation interval.
    #[serde(serialize_with = "serialize_duration")]
    pub interval: Duration,
    /// Rules in evaluation order.
    pub rules: Vec<AlertingRule>,
}

impl RuleGroup {
    /// Creates a rule group.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if the name is empty, the interval is
    /// zero or there are no rules.
    pub fn new(name: impl Into<String>, interval: Duration, rules: Vec<AlertingRule>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CaseError::construction("rule group name cannot be empty"));
        }
        if interval.is_zero() {
            return Err(CaseError::construction(format!(
                "rule group '{name}' has a zero evaluation interval"
            )));
        }
        if rules.is_empty() {
            return Err(CaseError::construction(format!(
                "rule group '{name}' has no rules"
            )));
        }
        Ok(Self {
            name,
            interval,
            rules,
        })
    }

    /// Serializes this group alone as a rule document.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if encoding fails.
    pub fn to_document(&self) -> Result<String> {
        RuleFile::from_groups(vec![self.clone()])?.to_document()
    }
}

/// The rule file the SUT loads: every selected scenario's group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleFile {
    /// Rule groups.
    pub groups: Vec<RuleGroup>,
}

impl RuleFile {
    /// Creates a rule file from groups.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if two groups share a name.
    pub fn from_groups(groups: Vec<RuleGroup>) -> Result<Self> {
        let mut seen = HashSet::new();
        for group in &groups {
            if !seen.insert(group.name.as_str()) {
                return Err(CaseError::construction(format!(
                    "duplicate rule group '{}'",
                    group.name
                )));
            }
        }
        Ok(Self { groups })
    }

    /// Builds the rule file for a set of cases.
    ///
    /// # Errors
    ///
    /// Returns the first case's construction error, or a duplicate-group error.
    pub fn from_cases(cases: &[Arc<dyn TestCase>]) -> Result<Self> {
        let groups = cases
            .iter()
            .map(|case| case.rule_group())
            .collect::<Result<Vec<_>>>()?;
        Self::from_groups(groups)
    }

    /// Encodes the rule file.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if encoding fails.
    pub fn to_document(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the number of rules across all groups.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }
}
