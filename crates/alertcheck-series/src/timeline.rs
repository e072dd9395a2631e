//! Synthetic, evenly-stepped input series.
//!
//! A [`Timeline`] is defined relative to a zero time that is only known once
//! the driver starts pushing. [`Timeline::anchor`] turns it into the absolute
//! [`TimeSeries`] handed to the ingestion transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{LabelSet, Sample, TimeSeries};

/// A labeled sequence of values spaced by a fixed step.
///
/// Sample `i` sits at `zero_time + i * step`. There are no gaps and values are
/// never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    labels: LabelSet,
    step_millis: i64,
    values: Vec<f64>,
}

impl Timeline {
    /// Creates a timeline from a step and a list of values.
    #[must_use]
    pub fn new(labels: LabelSet, step: Duration, values: Vec<f64>) -> Self {
        Self {
            labels,
            step_millis: step.as_millis() as i64,
            values,
        }
    }

    /// Starts a timeline builder.
    #[must_use]
    pub fn builder(labels: LabelSet, step: Duration) -> TimelineBuilder {
        TimelineBuilder::new(labels, step)
    }

    /// Returns the series labels.
    #[must_use]
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Returns the step between samples.
    #[must_use]
    pub const fn step(&self) -> Duration {
        Duration::from_millis(self.step_millis as u64)
    }

    /// Returns the raw values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the timeline holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the offset of the last sample from zero time, in milliseconds.
    #[must_use]
    pub fn last_offset_millis(&self) -> Option<i64> {
        let last = self.values.len().checked_sub(1)?;
        Some(last as i64 * self.step_millis)
    }

    /// Returns the value in effect `elapsed_millis` after zero time, i.e. the
    /// last sample at or before that offset.
    #[must_use]
    pub fn value_at(&self, elapsed_millis: i64) -> Option<f64> {
        if elapsed_millis < 0 {
            return None;
        }
        if self.step_millis <= 0 {
            return self.values.last().copied();
        }
        let index = (elapsed_millis / self.step_millis) as usize;
        let index = index.min(self.values.len().checked_sub(1)?);
        self.values.get(index).copied()
    }

    /// Produces the absolute series starting at `zero_time` (Unix millis).
    #[must_use]
    pub fn anchor(&self, zero_time: i64) -> TimeSeries {
        let samples = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample::new(zero_time + i as i64 * self.step_millis, value))
            .collect();
        TimeSeries::new(self.labels.clone(), samples)
    }
}

/// Builder for [`Timeline`] with run-length helpers.
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    labels: LabelSet,
    step: Duration,
    values: Vec<f64>,
}

impl TimelineBuilder {
    fn new(labels: LabelSet, step: Duration) -> Self {
        Self {
            labels,
            step,
            values: Vec::new(),
        }
    }

    /// Appends a single value.
    #[must_use]
    pub fn then(mut self, value: f64) -> Self {
        self.values.push(value);
        self
    }

    /// Appends `value` `count` times.
    #[must_use]
    pub fn repeat(mut self, value: f64, count: usize) -> Self {
        self.values.extend(std::iter::repeat_n(value, count));
        self
    }

    /// Appends several values in order.
    #[must_use]
    pub fn values(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.values.extend(values);
        self
    }

    /// Builds the timeline.
    #[must_use]
    pub fn build(self) -> Timeline {
        Timeline::new(self.labels, self.step, self.values)
    }
}
