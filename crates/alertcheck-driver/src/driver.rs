//! Runs scenarios against the system under test.
//!
//! A run loads the rule groups of every selected case once, fixes a zero time,
//! then drives each case on its own task: push the anchored timeline, then
//! poll alerts and the derived metric until the case's horizon. Mismatches
//! are recorded and polling continues; transport failures that survive the
//! retry budget stop only the affected case.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alertcheck_cases::{ArmedCase, CaseError, RuleFile, TestCase};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{DriverConfig, PollingConfig};
use crate::error::{DriverError, Result};
use crate::http::{FileRuleLoader, QueryApiClient, RemoteWriteClient};
use crate::report::{CaseReport, MismatchRecord, SuiteReport};
use crate::transport::{AlertSource, Ingestor, RuleLoader};

/// The three connections to the system under test.
#[derive(Clone)]
pub struct Transports {
    /// Where input series are pushed.
    pub ingestor: Arc<dyn Ingestor>,
    /// Where alerts and derived samples are read.
    pub source: Arc<dyn AlertSource>,
    /// Where the rule file is installed.
    pub rules: Arc<dyn RuleLoader>,
}

/// Poll cadence and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Time between polls of one case.
    pub poll_interval: Duration,
    /// Limit on a single transport call.
    pub request_timeout: Duration,
    /// Attempts per call before giving up.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_backoff: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            request_timeout: config.request_timeout(),
            max_retries: config.max_retries.max(1),
            retry_backoff: config.retry_backoff(),
        }
    }
}

/// Runs `call` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. Each attempt is bounded by the request timeout.
async fn with_retry<T, F, Fut>(settings: &PollSettings, operation: &'static str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = match tokio::time::timeout(settings.request_timeout, call()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(DriverError::transport(
                operation,
                format!("timed out after {}ms", settings.request_timeout.as_millis()),
            )),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < settings.max_retries => {
                warn!(
                    operation,
                    attempt,
                    max_retries = settings.max_retries,
                    error = %e,
                    "Transport call failed, retrying"
                );
                tokio::time::sleep(settings.retry_backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Drives a suite run.
pub struct Driver {
    transports: Transports,
    clock: Arc<dyn Clock>,
    settings: PollSettings,
}

impl Driver {
    /// Creates a driver on the system clock.
    #[must_use]
    pub fn new(transports: Transports, settings: PollSettings) -> Self {
        Self {
            transports,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    /// Creates a driver with HTTP transports built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Config` if the configuration is invalid or an
    /// HTTP client cannot be built.
    pub fn from_config(config: &DriverConfig) -> Result<Self> {
        config.validate()?;
        let timeout = config.polling.request_timeout();

        let mut rules = FileRuleLoader::new(&config.rules.path);
        if let Some(url) = &config.rules.reload_url {
            rules = rules.with_reload(url, timeout)?;
        }

        let transports = Transports {
            ingestor: Arc::new(RemoteWriteClient::new(&config.remote_write_url, timeout)?),
            source: Arc::new(QueryApiClient::new(&config.query_base_url, timeout)?),
            rules: Arc::new(rules),
        };
        Ok(Self::new(transports, PollSettings::from(&config.polling)))
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs `cases` to completion.
    ///
    /// Cases whose rule group cannot be built are reported as failed without
    /// touching the SUT. Every other case runs concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error only if the combined rule file cannot be built or
    /// loaded; per-case failures are in the report.
    pub async fn run(&self, cases: &[Arc<dyn TestCase>]) -> Result<SuiteReport> {
        let mut reports = Vec::new();
        let mut runnable = Vec::new();
        let mut groups = Vec::new();

        for case in cases {
            match case.rule_group() {
                Ok(group) => {
                    groups.push(group);
                    runnable.push(Arc::clone(case));
                }
                Err(e) => {
                    let description = case.describe();
                    error!(case = %description.title, error = %e, "Rule group construction failed");
                    reports.push(CaseReport::aborted(&description, e.to_string()));
                }
            }
        }

        if runnable.is_empty() {
            warn!("No runnable cases");
            return Ok(SuiteReport::new(reports));
        }

        let rule_file = RuleFile::from_groups(groups)?;
        with_retry(&self.settings, "load rules", || {
            self.transports.rules.load(&rule_file)
        })
        .await?;
        info!(
            groups = rule_file.groups.len(),
            rules = rule_file.rule_count(),
            "Rules loaded"
        );

        let zero_time = self.clock.now_millis().div_euclid(1000) * 1000;
        info!(zero_time, cases = runnable.len(), "Starting run");

        let mut handles = Vec::with_capacity(runnable.len());
        for case in runnable {
            let runner = CaseRunner {
                armed: ArmedCase::init(case, zero_time),
                transports: self.transports.clone(),
                clock: Arc::clone(&self.clock),
                settings: self.settings,
            };
            let description = runner.armed.description().clone();
            handles.push((description, tokio::spawn(runner.run())));
        }

        for (description, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    error!(case = %description.title, error = %e, "Case task failed");
                    CaseReport::aborted(&description, format!("case task failed: {e}"))
                }
            };
            reports.push(report);
        }

        let suite = SuiteReport::new(reports);
        info!(
            cases = suite.cases.len(),
            failed = suite.failed_count(),
            "Run finished"
        );
        Ok(suite)
    }
}

/// One armed case and everything it needs to run on its own task.
struct CaseRunner {
    armed: ArmedCase,
    transports: Transports,
    clock: Arc<dyn Clock>,
    settings: PollSettings,
}

impl CaseRunner {
    async fn run(self) -> CaseReport {
        let mut report = CaseReport::new(self.armed.description());
        report.zero_time = Some(self.armed.zero_time());
        info!(
            case = %self.armed.name(),
            zero_time = self.armed.zero_time(),
            test_until = self.armed.test_until(),
            "Case started"
        );

        let series = vec![self.armed.timeline_series()];
        if let Err(e) = with_retry(&self.settings, "remote write", || {
            self.transports.ingestor.push(&series)
        })
        .await
        {
            error!(case = %self.armed.name(), error = %e, "Failed to push timeline");
            report.fatal = Some(e.to_string());
            return report;
        }

        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let remaining = self.armed.test_until() - self.clock.now_millis();
            if remaining <= 0 {
                break;
            }

            let budget = Duration::from_millis(remaining as u64);
            match tokio::time::timeout(budget, self.poll()).await {
                Ok(Ok(Some(mismatches))) => {
                    report.polls += 1;
                    report.mismatches.extend(mismatches);
                }
                Ok(Err(e)) => {
                    error!(case = %self.armed.name(), error = %e, "Polling stopped");
                    report.fatal = Some(e.to_string());
                    break;
                }
                Ok(Ok(None)) | Err(_) => {
                    debug!(case = %self.armed.name(), "Horizon reached during poll");
                    break;
                }
            }
        }

        info!(
            case = %report.name,
            polls = report.polls,
            mismatches = report.mismatches.len(),
            verdict = report.verdict(),
            "Case finished"
        );
        report
    }

    /// Checks the SUT once. The poll time is taken after the alert listing
    /// arrives, so a retried listing is judged against the state at the time
    /// it was served. Returns `None` if that time is past the horizon.
    async fn poll(&self) -> Result<Option<Vec<MismatchRecord>>> {
        let alerts: Vec<_> = with_retry(&self.settings, "list alerts", || {
            self.transports.source.alerts()
        })
        .await?
        .into_iter()
        .filter(|alert| self.armed.owns_alert(alert))
        .collect();

        let ts = self.clock.now_millis();
        if ts >= self.armed.test_until() {
            return Ok(None);
        }

        let query = self.armed.metrics_query();
        let samples = with_retry(&self.settings, "instant query", || {
            self.transports.source.query(&query, ts)
        })
        .await?;

        let mut mismatches = Vec::new();
        for outcome in [
            self.armed.check_alerts(ts, &alerts),
            self.armed.check_metrics(ts, &samples),
        ] {
            match outcome {
                Ok(()) => {}
                Err(CaseError::Mismatch(mismatch)) => {
                    warn!(case = %self.armed.name(), error = %mismatch, "State mismatch");
                    mismatches.push(MismatchRecord::new(ts, mismatch));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(mismatches))
    }
}
