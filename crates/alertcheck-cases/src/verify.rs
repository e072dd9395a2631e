//! Checks SUT responses against an [`Expectation`].
//!
//! A response passes if it equals *any* alternative. Both sides are compared
//! as unordered multisets keyed by label set; an extra or missing member is a
//! mismatch even when the rest lines up.

use std::cmp::Ordering;

use crate::error::MismatchError;
use crate::model::{Alternative, Expectation};
use crate::types::{ExpectedAlert, InstantSample, ObservedAlert};

fn by_labels<T>(items: &[T], labels: impl Fn(&T) -> &alertcheck_series::LabelSet) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| labels(a).cmp(labels(b)));
    sorted
}

fn alerts_match(alternative: &Alternative, actual: &[ObservedAlert]) -> bool {
    if alternative.alerts.len() != actual.len() {
        return false;
    }

    let expected = by_labels(&alternative.alerts, |a: &ExpectedAlert| &a.labels);
    let observed = by_labels(actual, |a: &ObservedAlert| &a.labels);

    expected.iter().zip(observed.iter()).all(|(exp, obs)| {
        exp.matches(obs)
            && alternative
                .active_since
                .is_none_or(|range| range.contains(obs.active_at))
    })
}

fn compare_samples(a: &InstantSample, b: &InstantSample) -> Ordering {
    a.labels
        .cmp(&b.labels)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
}

#[allow(clippy::float_cmp)] // inputs are small integers
fn samples_match(alternative: &Alternative, actual: &[InstantSample]) -> bool {
    if alternative.samples.len() != actual.len() {
        return false;
    }

    let mut expected: Vec<&InstantSample> = alternative.samples.iter().collect();
    let mut observed: Vec<&InstantSample> = actual.iter().collect();
    expected.sort_by(|a, b| compare_samples(a, b));
    observed.sort_by(|a, b| compare_samples(a, b));

    expected.iter().zip(observed.iter()).all(|(exp, obs)| {
        exp.labels == obs.labels && exp.timestamp == obs.timestamp && exp.value == obs.value
    })
}

fn render_list<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    let rendered: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

fn render_alert_alternative(alternative: &Alternative) -> String {
    let alerts = render_list(&alternative.alerts);
    match alternative.active_since {
        Some(range) => format!("{}: {alerts} active_since={range}", alternative.phase),
        None => format!("{}: {alerts}", alternative.phase),
    }
}

fn mismatch(expectation: &Expectation, kind: &'static str, expected: Vec<String>, actual: String) -> MismatchError {
    MismatchError {
        kind,
        elapsed_millis: expectation.elapsed_millis,
        region: expectation.region.to_string(),
        expected,
        actual,
    }
}

/// Succeeds if `actual` equals one of the alert alternatives and every
/// alert's active-since lies in that alternative's range.
///
/// # Errors
///
/// Returns a [`MismatchError`] listing every alternative and the actual set.
pub fn check_alerts(expectation: &Expectation, actual: &[ObservedAlert]) -> Result<(), MismatchError> {
    if expectation
        .alternatives
        .iter()
        .any(|alternative| alerts_match(alternative, actual))
    {
        return Ok(());
    }

    Err(mismatch(
        expectation,
        "alerts",
        expectation
            .alternatives
            .iter()
            .map(render_alert_alternative)
            .collect(),
        render_list(actual),
    ))
}

/// Succeeds if `actual` equals one of the sample alternatives.
///
/// # Errors
///
/// Returns a [`MismatchError`] listing every alternative and the actual set.
pub fn check_metrics(expectation: &Expectation, actual: &[InstantSample]) -> Result<(), MismatchError> {
    if expectation
        .alternatives
        .iter()
        .any(|alternative| samples_match(alternative, actual))
    {
        return Ok(());
    }

    Err(mismatch(
        expectation,
        "metrics",
        expectation
            .alternatives
            .iter()
            .map(|alternative| format!("{}: {}", alternative.phase, render_list(&alternative.samples)))
            .collect(),
        render_list(actual),
    ))
}
