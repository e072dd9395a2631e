//! Wall-clock sources for poll timestamps.

use std::fmt;

use tokio::time::Instant;

/// Source of the current Unix time in milliseconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current time (Unix millis).
    fn now_millis(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Wall time at construction plus Tokio's monotonic elapsed time.
///
/// Immune to wall-clock steps during a run, and follows paused Tokio time,
/// which lets a whole run be replayed without real waiting.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin_millis: i64,
    origin: Instant,
}

impl MonotonicClock {
    /// Anchors the clock at `origin_millis`.
    #[must_use]
    pub fn starting_at(origin_millis: i64) -> Self {
        Self {
            origin_millis,
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.origin_millis.saturating_add(elapsed)
    }
}
