//! Full runs of the built-in scenarios against a simulated evaluator.
//!
//! Tokio time is paused, so each 26 minute run completes instantly.

mod support;

use std::sync::Arc;

use alertcheck_cases::{registry, TestCase};
use alertcheck_driver::{Clock, Driver, MonotonicClock, PollSettings, SuiteReport, Transports};
use support::{Fault, SimulatedEvaluator};

const ORIGIN: i64 = 1_700_000_000_000;
const CASE: &str = "PendingAndFiringAndResolved";

/// Polls from 0s to 1550s at 10s spacing.
const FULL_POLLS: u32 = 156;

fn cases() -> Vec<Arc<dyn TestCase>> {
    registry().unwrap().select(&[CASE]).unwrap()
}

async fn run_against(evaluator: Arc<SimulatedEvaluator>, clock: Arc<dyn Clock>) -> SuiteReport {
    let transports = Transports {
        ingestor: evaluator.clone(),
        source: evaluator.clone(),
        rules: evaluator,
    };
    Driver::new(transports, PollSettings::default())
        .with_clock(clock)
        .run(&cases())
        .await
        .unwrap()
}

async fn run_with(offset_millis: i64, fault: Fault) -> (SuiteReport, Arc<SimulatedEvaluator>) {
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::starting_at(ORIGIN));
    let evaluator =
        Arc::new(SimulatedEvaluator::new(Arc::clone(&clock), offset_millis).with_fault(fault));
    let report = run_against(Arc::clone(&evaluator), clock).await;
    (report, evaluator)
}

mod conforming {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn passes_with_evaluations_on_boundaries() {
        let (report, evaluator) = run_with(0, Fault::None).await;

        let case = report.case(CASE).unwrap();
        assert!(case.passed(), "unexpected failures: {:?}", case.mismatches);
        assert_eq!(case.polls, FULL_POLLS);
        assert_eq!(case.zero_time, Some(ORIGIN));
        assert_eq!(evaluator.series_count(), 1);
        assert_eq!(evaluator.listings(), FULL_POLLS);
    }

    #[tokio::test(start_paused = true)]
    async fn passes_with_offset_evaluations() {
        let (report, _) = run_with(7_000, Fault::None).await;
        let case = report.case(CASE).unwrap();
        assert!(case.passed(), "unexpected failures: {:?}", case.mismatches);
    }

    #[tokio::test(start_paused = true)]
    async fn passes_with_late_evaluations() {
        let (report, _) = run_with(29_000, Fault::None).await;
        let case = report.case(CASE).unwrap();
        assert!(case.passed(), "unexpected failures: {:?}", case.mismatches);
    }

    #[tokio::test(start_paused = true)]
    async fn rides_out_transient_listing_failures() {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::starting_at(ORIGIN));
        let evaluator = Arc::new(
            SimulatedEvaluator::new(Arc::clone(&clock), 7_000).with_failing_listings(2),
        );
        let report = run_against(Arc::clone(&evaluator), clock).await;

        assert!(report.passed());
        assert!(report.case(CASE).unwrap().polls > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn listing_retried_across_firing_boundary_is_judged_when_served() {
        // The 290s listing hangs twice, so it is served after the alert fires at 300s.
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::starting_at(ORIGIN));
        let evaluator = Arc::new(
            SimulatedEvaluator::new(Arc::clone(&clock), 0)
                .with_stalled_listings(ORIGIN + 290_000, 2),
        );
        let report = run_against(Arc::clone(&evaluator), clock).await;

        let case = report.case(CASE).unwrap();
        assert!(case.passed(), "unexpected failures: {:?}", case.mismatches);
        assert!(case.fatal.is_none());
        assert!(case.polls < FULL_POLLS);
    }
}

mod faulty {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn firing_early_is_caught_while_pending() {
        let (report, _) = run_with(0, Fault::IgnoreFor).await;
        let case = report.case(CASE).unwrap();

        assert!(!case.passed());
        assert!(case.fatal.is_none());
        assert_eq!(case.polls, FULL_POLLS);

        let first = &case.mismatches[0];
        assert!(first.elapsed_millis >= 120_000);
        assert!(first.elapsed_millis < 300_000);
        assert!(case.mismatches.iter().any(|m| m.kind == "alerts"));
        assert!(case.mismatches.iter().any(|m| m.kind == "metrics"));
    }

    #[tokio::test(start_paused = true)]
    async fn never_resolving_is_caught_after_the_band() {
        let (report, _) = run_with(0, Fault::NeverResolve).await;
        let case = report.case(CASE).unwrap();

        assert!(!case.passed());
        assert!(case.fatal.is_none());
        assert!(
            case.mismatches
                .iter()
                .all(|m| m.elapsed_millis >= 525_000 && m.region == "resolved")
        );
        assert_eq!(report.failed_count(), 1);
    }
}
