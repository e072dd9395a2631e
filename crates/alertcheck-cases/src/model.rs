//! Expected-state model.
//!
//! An alert walks through a fixed sequence of phases (for example
//! inactive → pending → firing → resolved). Each phase change happens at a
//! nominal boundary, but the SUT evaluates on its own cadence and polls are not
//! synchronized with it, so the observable change can land anywhere inside a
//! tolerance band around the boundary.
//!
//! [`WindowPlan`] turns the boundaries into one [`StateWindow`] per phase:
//!
//! ```text
//! phase i:  [boundary(i-1) - before, boundary(i) + after)
//! ```
//!
//! Adjacent windows overlap only inside a band. The acceptable set at elapsed
//! time `t` is the union of the windows that contain `t`: one phase in a firm
//! region, two inside a band.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CaseError, Result};
use crate::types::{ActiveSinceRange, ExpectedAlert, ExpectedSample};

/// A semantic phase of a single alert's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPhase {
    /// Nothing to report yet.
    Inactive,
    /// Condition true, `for` duration not yet elapsed.
    Pending,
    /// Condition held for the `for` duration.
    Firing,
    /// Condition no longer true after having fired.
    Resolved,
}

impl AlertPhase {
    /// Returns the phase as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Firing => "firing",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A nominal phase change at `at` after zero time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Nominal boundary, relative to zero time.
    pub at: Duration,
    /// Phase entered at the boundary.
    pub to: AlertPhase,
}

impl Transition {
    /// Creates a transition.
    #[must_use]
    pub const fn new(at: Duration, to: AlertPhase) -> Self {
        Self { at, to }
    }
}

/// Width of the band around each boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance {
    /// How early the next phase may become visible.
    pub before: Duration,
    /// How late the previous phase may still be visible.
    pub after: Duration,
}

impl Tolerance {
    /// Slack before a boundary for polls that race the sample push.
    pub const BOUNDARY_SLACK: Duration = Duration::from_secs(1);

    /// Creates a tolerance.
    #[must_use]
    pub const fn new(before: Duration, after: Duration) -> Self {
        Self { before, after }
    }

    /// The band for a group evaluated every `interval`: the change may show up
    /// to one full interval after the boundary.
    #[must_use]
    pub const fn for_interval(interval: Duration) -> Self {
        Self::new(Self::BOUNDARY_SLACK, interval)
    }

    fn before_millis(&self) -> i64 {
        self.before.as_millis() as i64
    }

    fn after_millis(&self) -> i64 {
        self.after.as_millis() as i64
    }
}

/// A half-open interval `[start, end)` of elapsed milliseconds during which
/// `phase` is an acceptable representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateWindow {
    /// The phase this window admits.
    pub phase: AlertPhase,
    /// Start offset (inclusive).
    pub start: i64,
    /// End offset (exclusive).
    pub end: i64,
}

impl StateWindow {
    /// Checks half-open containment.
    #[must_use]
    pub const fn contains(&self, elapsed_millis: i64) -> bool {
        elapsed_millis >= self.start && elapsed_millis < self.end
    }
}

/// The named region an elapsed time falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Exactly one phase is acceptable.
    Firm(AlertPhase),
    /// Inside a band: either side of the boundary is acceptable.
    Transition {
        /// Phase before the boundary.
        from: AlertPhase,
        /// Phase after the boundary.
        to: AlertPhase,
    },
    /// Before zero time or past the horizon.
    Outside,
}

impl Region {
    /// Returns the region's phases in lifecycle order.
    #[must_use]
    pub fn phases(&self) -> Vec<AlertPhase> {
        match *self {
            Self::Firm(phase) => vec![phase],
            Self::Transition { from, to } => vec![from, to],
            Self::Outside => Vec::new(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Firm(phase) => write!(f, "{phase}"),
            Self::Transition { to, .. } => write!(f, "maybe-{to}"),
            Self::Outside => write!(f, "outside"),
        }
    }
}

/// One acceptable representation of the SUT's state at a poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    /// The phase this alternative stands for.
    pub phase: AlertPhase,
    /// Alerts the listing must contain, exactly.
    pub alerts: Vec<ExpectedAlert>,
    /// Where each alert's active-since must fall. `None` when there are no alerts.
    pub active_since: Option<ActiveSinceRange>,
    /// Samples the derived metric must contain, exactly.
    pub samples: Vec<ExpectedSample>,
}

impl Alternative {
    /// The "nothing to report" alternative.
    #[must_use]
    pub const fn empty(phase: AlertPhase) -> Self {
        Self {
            phase,
            alerts: Vec::new(),
            active_since: None,
            samples: Vec::new(),
        }
    }
}

/// Every acceptable alternative at one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    /// Milliseconds since zero time.
    pub elapsed_millis: i64,
    /// Region the poll fell into.
    pub region: Region,
    /// Acceptable alternatives, in lifecycle order.
    pub alternatives: Vec<Alternative>,
}

/// The ordered list of state windows for one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    windows: Vec<StateWindow>,
    transitions: Vec<(i64, AlertPhase)>,
    tolerance: Tolerance,
    horizon: i64,
}

impl WindowPlan {
    /// Derives the windows for an alert that starts in `initial` and moves
    /// through `transitions` until `horizon`.
    ///
    /// The last window is bounded by the horizon only.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Construction` if the boundaries are not strictly
    /// increasing, if two boundaries are closer than the band width (which
    /// would let three phases overlap), if the band has zero width, or if a
    /// boundary lies outside `(0, horizon)`.
    pub fn new(
        initial: AlertPhase,
        transitions: &[Transition],
        tolerance: Tolerance,
        horizon: Duration,
    ) -> Result<Self> {
        let horizon = horizon.as_millis() as i64;
        let before = tolerance.before_millis();
        let after = tolerance.after_millis();

        if after <= 0 {
            return Err(CaseError::construction(
                "tolerance band must extend past the boundary",
            ));
        }

        let boundaries: Vec<(i64, AlertPhase)> = transitions
            .iter()
            .map(|t| (t.at.as_millis() as i64, t.to))
            .collect();

        let mut previous = 0;
        for (i, &(at, _)) in boundaries.iter().enumerate() {
            if at <= 0 || at >= horizon {
                return Err(CaseError::construction(format!(
                    "transition at {at}ms lies outside the horizon (0, {horizon}ms)"
                )));
            }
            if i > 0 && at - previous <= before + after {
                return Err(CaseError::construction(format!(
                    "transitions at {previous}ms and {at}ms are within one tolerance band"
                )));
            }
            previous = at;
        }

        let mut windows = Vec::with_capacity(boundaries.len() + 1);
        let mut phase = initial;
        let mut start = 0;
        for &(at, next) in &boundaries {
            windows.push(StateWindow {
                phase,
                start,
                end: (at + after).min(horizon),
            });
            phase = next;
            start = (at - before).max(0);
        }
        windows.push(StateWindow {
            phase,
            start,
            end: horizon,
        });

        Ok(Self {
            windows,
            transitions: boundaries,
            tolerance,
            horizon,
        })
    }

    /// Returns the windows in lifecycle order.
    #[must_use]
    pub fn windows(&self) -> &[StateWindow] {
        &self.windows
    }

    /// Returns the horizon in milliseconds after zero time.
    #[must_use]
    pub const fn horizon_millis(&self) -> i64 {
        self.horizon
    }

    /// Returns the tolerance used to build the plan.
    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Returns the windows containing `elapsed_millis`.
    pub fn covering(&self, elapsed_millis: i64) -> impl Iterator<Item = &StateWindow> {
        self.windows.iter().filter(move |w| w.contains(elapsed_millis))
    }

    /// Names the region `elapsed_millis` falls into.
    #[must_use]
    pub fn region(&self, elapsed_millis: i64) -> Region {
        let mut covering = self.covering(elapsed_millis);
        match (covering.next(), covering.next()) {
            (None, _) => Region::Outside,
            (Some(only), None) => Region::Firm(only.phase),
            (Some(from), Some(to)) => Region::Transition {
                from: from.phase,
                to: to.phase,
            },
        }
    }

    /// The closed range an alert may report as its active-since time: from
    /// the first boundary that enters an active phase to one band-width later.
    ///
    /// Returns `None` if the plan never becomes active.
    #[must_use]
    pub fn active_since(&self, zero_time: i64) -> Option<ActiveSinceRange> {
        let (at, _) = self
            .transitions
            .iter()
            .find(|(_, to)| matches!(to, AlertPhase::Pending | AlertPhase::Firing))?;
        let earliest = zero_time + at;
        Some(ActiveSinceRange::new(
            earliest,
            earliest + self.tolerance.after_millis(),
        ))
    }

    /// Builds the expectation at `elapsed_millis`, asking `alternative` for the
    /// representation of every covering phase.
    pub fn expectation<F>(&self, elapsed_millis: i64, mut alternative: F) -> Expectation
    where
        F: FnMut(AlertPhase) -> Alternative,
    {
        let region = self.region(elapsed_millis);
        let alternatives = self
            .covering(elapsed_millis)
            .map(|window| alternative(window.phase))
            .collect();
        Expectation {
            elapsed_millis,
            region,
            alternatives,
        }
    }
}
