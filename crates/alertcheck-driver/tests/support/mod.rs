//! In-memory stand-in for a Prometheus-compatible system under test.
//!
//! Evaluates loaded alerting rules over pushed series on a fixed cadence the
//! way a rule manager does: an alert goes pending on the first evaluation that
//! sees the condition true, fires once it has been pending for the rule's
//! `for` duration, and is kept as `inactive` once the condition turns false.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use alertcheck_cases::{
    AlertCondition, AlertState, AlertingRule, ComparisonOperator, InstantSample, ObservedAlert,
    RuleFile, RuleGroup, ALERTS_METRIC,
};
use alertcheck_driver::{
    AlertSource, Clock, DriverError, Ingestor, RuleLoader, TransportFuture,
};
use alertcheck_series::{LabelSet, TimeSeries, METRIC_NAME_LABEL};
use parking_lot::Mutex;

/// How far back an evaluation looks for the latest sample.
const LOOKBACK_MILLIS: i64 = 5 * 60 * 1000;

/// Deliberate deviations from correct evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fault {
    /// Evaluate correctly.
    #[default]
    None,
    /// Fire as soon as the condition holds, ignoring `for`.
    IgnoreFor,
    /// Keep firing after the condition turns false.
    NeverResolve,
}

#[derive(Debug, Default)]
struct Store {
    series: Vec<TimeSeries>,
    groups: Vec<RuleGroup>,
    loaded_at: i64,
}

/// The simulated system under test.
#[derive(Debug)]
pub struct SimulatedEvaluator {
    clock: Arc<dyn Clock>,
    offset_millis: i64,
    fault: Fault,
    failing_listings: AtomicU32,
    stalled_listings: AtomicU32,
    stall_from: i64,
    listings: AtomicU32,
    store: Mutex<Store>,
}

#[derive(Debug, Clone)]
struct AlertRecord {
    state: AlertState,
    active_at: i64,
    value: f64,
}

impl SimulatedEvaluator {
    /// Creates an evaluator whose group evaluations land `offset_millis` past
    /// each interval boundary.
    pub fn new(clock: Arc<dyn Clock>, offset_millis: i64) -> Self {
        Self {
            clock,
            offset_millis,
            fault: Fault::None,
            failing_listings: AtomicU32::new(0),
            stalled_listings: AtomicU32::new(0),
            stall_from: i64::MAX,
            listings: AtomicU32::new(0),
            store: Mutex::new(Store::default()),
        }
    }

    /// Misbehaves in the given way.
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    /// Fails the next `count` alert listings.
    pub fn with_failing_listings(self, count: u32) -> Self {
        self.failing_listings.store(count, Ordering::SeqCst);
        self
    }

    /// Hangs the first `count` alert listings requested at or after
    /// `from_millis` (Unix millis) until the caller gives up on them.
    pub fn with_stalled_listings(mut self, from_millis: i64, count: u32) -> Self {
        self.stall_from = from_millis;
        self.stalled_listings.store(count, Ordering::SeqCst);
        self
    }

    /// Number of alert listings served.
    pub fn listings(&self) -> u32 {
        self.listings.load(Ordering::SeqCst)
    }

    /// Number of series received.
    pub fn series_count(&self) -> usize {
        self.store.lock().series.len()
    }

    fn value_at(series: &[TimeSeries], selector: &LabelSet, t: i64) -> Option<f64> {
        series
            .iter()
            .filter(|s| selector.iter().all(|(k, v)| s.labels.get(k) == Some(v)))
            .filter_map(|s| {
                s.samples
                    .iter()
                    .rev()
                    .find(|sample| sample.timestamp <= t && t - sample.timestamp <= LOOKBACK_MILLIS)
                    .map(|sample| sample.value)
            })
            .next()
    }

    fn first_evaluation(&self, loaded_at: i64, interval: i64) -> i64 {
        let phase = (loaded_at - self.offset_millis).rem_euclid(interval);
        if phase == 0 {
            loaded_at
        } else {
            loaded_at + interval - phase
        }
    }

    fn evaluate(&self, store: &Store, group: &RuleGroup, rule: &AlertingRule, now: i64) -> Option<AlertRecord> {
        let interval = group.interval.as_millis() as i64;
        let hold = rule.for_duration.as_millis() as i64;
        let mut record: Option<AlertRecord> = None;

        let mut t = self.first_evaluation(store.loaded_at, interval);
        while t <= now {
            let value = Self::value_at(&store.series, &rule.condition.selector, t);
            let holds = value.is_some_and(|v| condition_holds(&rule.condition, v));

            let active = record.as_ref().is_some_and(|alert| alert.state.is_active());
            match (holds, record.as_mut()) {
                (true, Some(alert)) if active => {
                    alert.value = value.unwrap_or(f64::NAN);
                    if alert.state == AlertState::Pending
                        && (t - alert.active_at >= hold || self.fault == Fault::IgnoreFor)
                    {
                        alert.state = AlertState::Firing;
                    }
                }
                (true, _) => {
                    let state = if hold == 0 || self.fault == Fault::IgnoreFor {
                        AlertState::Firing
                    } else {
                        AlertState::Pending
                    };
                    record = Some(AlertRecord {
                        state,
                        active_at: t,
                        value: value.unwrap_or(f64::NAN),
                    });
                }
                (false, Some(alert)) if active && self.fault != Fault::NeverResolve => {
                    alert.state = AlertState::Inactive;
                    if let Some(v) = value {
                        alert.value = v;
                    }
                }
                _ => {}
            }
            t += interval;
        }
        record
    }

    fn alert_labels(rule: &AlertingRule) -> LabelSet {
        let mut labels = rule.condition.selector.without(METRIC_NAME_LABEL);
        for (k, v) in rule.labels.iter() {
            labels.insert(k, v);
        }
        labels.insert("alertname", rule.alert.as_str());
        labels
    }

    fn current_alerts(&self, now: i64) -> Vec<(LabelSet, LabelSet, AlertRecord)> {
        let store = self.store.lock();
        let mut alerts = Vec::new();
        for group in &store.groups {
            for rule in &group.rules {
                if let Some(record) = self.evaluate(&store, group, rule, now) {
                    alerts.push((Self::alert_labels(rule), rule.annotations.clone(), record));
                }
            }
        }
        alerts
    }
}

#[allow(clippy::float_cmp)]
fn condition_holds(condition: &AlertCondition, value: f64) -> bool {
    let threshold = condition.threshold;
    match condition.operator {
        ComparisonOperator::GreaterThan => value > threshold,
        ComparisonOperator::GreaterThanOrEqual => value >= threshold,
        ComparisonOperator::LessThan => value < threshold,
        ComparisonOperator::LessThanOrEqual => value <= threshold,
        ComparisonOperator::Equal => value == threshold,
        ComparisonOperator::NotEqual => value != threshold,
    }
}

fn parse_selector(expr: &str) -> Option<LabelSet> {
    let body = expr.strip_prefix(ALERTS_METRIC)?.strip_prefix('{')?.strip_suffix('}')?;
    let mut labels = LabelSet::new();
    for matcher in body.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        let (name, value) = matcher.split_once('=')?;
        labels.insert(name.trim(), value.trim().trim_matches('"'));
    }
    Some(labels)
}

impl Ingestor for SimulatedEvaluator {
    fn push<'a>(&'a self, series: &'a [TimeSeries]) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            self.store.lock().series.extend(series.iter().cloned());
            Ok(())
        })
    }
}

impl AlertSource for SimulatedEvaluator {
    fn alerts(&self) -> TransportFuture<'_, Vec<ObservedAlert>> {
        Box::pin(async move {
            if self
                .failing_listings
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(DriverError::transport("list alerts", "connection reset by peer"));
            }
            if self.clock.now_millis() >= self.stall_from
                && self
                    .stalled_listings
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                std::future::pending::<()>().await;
            }
            self.listings.fetch_add(1, Ordering::SeqCst);

            let now = self.clock.now_millis();
            Ok(self
                .current_alerts(now)
                .into_iter()
                .map(|(labels, annotations, record)| ObservedAlert {
                    labels,
                    annotations,
                    state: record.state,
                    active_at: record.active_at,
                    value: format!("{:e}", record.value),
                })
                .collect())
        })
    }

    fn query<'a>(&'a self, expr: &'a str, timestamp: i64) -> TransportFuture<'a, Vec<InstantSample>> {
        Box::pin(async move {
            let selector = parse_selector(expr).ok_or_else(|| {
                DriverError::transport("instant query", format!("unsupported expression {expr}"))
            })?;
            Ok(self
                .current_alerts(timestamp)
                .into_iter()
                .filter(|(labels, _, _)| selector.iter().all(|(k, v)| labels.get(k) == Some(v)))
                .map(|(labels, _, record)| {
                    let labels = labels
                        .with(METRIC_NAME_LABEL, ALERTS_METRIC)
                        .with("alertstate", record.state.as_str());
                    InstantSample::new(labels, timestamp, record.value)
                })
                .collect())
        })
    }
}

impl RuleLoader for SimulatedEvaluator {
    fn load<'a>(&'a self, rules: &'a RuleFile) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let mut store = self.store.lock();
            store.groups = rules.groups.clone();
            store.loaded_at = self.clock.now_millis();
            Ok(())
        })
    }
}
