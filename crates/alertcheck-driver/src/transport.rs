//! Interfaces to the system under test.
//!
//! The driver only needs three capabilities: push series, read alerts and
//! derived samples, and load a rule file. Each is a trait so the HTTP
//! implementations in [`crate::http`] can be swapped for in-memory ones.

use std::future::Future;
use std::pin::Pin;

use alertcheck_cases::{InstantSample, ObservedAlert, RuleFile};
use alertcheck_series::TimeSeries;

use crate::error::Result;

/// A boxed transport call.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Accepts input series.
pub trait Ingestor: Send + Sync {
    /// Pushes a batch of series. Points must become queryable within one
    /// evaluation interval.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Transport` if the SUT rejects or never receives the batch.
    fn push<'a>(&'a self, series: &'a [TimeSeries]) -> TransportFuture<'a, ()>;
}

/// Reads the SUT's alert state.
pub trait AlertSource: Send + Sync {
    /// Lists every alert the SUT currently reports.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Transport` if the call fails.
    fn alerts(&self) -> TransportFuture<'_, Vec<ObservedAlert>>;

    /// Runs an instant query at `timestamp` (Unix millis).
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Transport` if the call fails or the result is not a vector.
    fn query<'a>(&'a self, expr: &'a str, timestamp: i64) -> TransportFuture<'a, Vec<InstantSample>>;
}

/// Installs a rule file in the SUT.
pub trait RuleLoader: Send + Sync {
    /// Loads `rules`, replacing whatever was loaded before.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the reload fails.
    fn load<'a>(&'a self, rules: &'a RuleFile) -> TransportFuture<'a, ()>;
}
