//! Label sets, samples and synthetic timelines for alert conformance scenarios.
//!
//! `alertcheck-series` holds the data every scenario pushes into a system
//! under test: a validated [`LabelSet`] identifying the series and a
//! [`Timeline`] of evenly spaced values that is anchored to the zero time
//! chosen when a run starts.
//!
//! # Example
//!
//! ```rust
//! use alertcheck_series::{LabelSet, Timeline};
//! use std::time::Duration;
//!
//! let labels = LabelSet::from_pairs([("__name__", "demo_metric"), ("job", "demo")]);
//! let timeline = Timeline::builder(labels, Duration::from_secs(15))
//!     .then(3.0)
//!     .repeat(11.0, 4)
//!     .build();
//!
//! let series = timeline.anchor(1_700_000_000_000);
//! assert_eq!(series.samples.len(), 5);
//! assert_eq!(series.samples[1].timestamp, 1_700_000_015_000);
//! ```

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/alertcheck-series/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod timeline;
pub mod types;

// Re-export main types at crate root
pub use error::{Result, SeriesError};
pub use timeline::{Timeline, TimelineBuilder};
pub use types::{
    validate_label_name, LabelSet, MetricName, Sample, TimeSeries, METRIC_NAME_LABEL,
};
