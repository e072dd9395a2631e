//! Driver configuration.
//!
//! Where the system under test lives and how it is polled:
//! - Remote-write endpoint for the input series
//! - Query API base URL for alerts and instant queries
//! - Rule file destination and optional reload hook
//! - Poll cadence, request timeout and retry policy

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, Result};

/// Where the combined rule file goes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RulesConfig {
    /// Path the rule document is written to.
    pub path: PathBuf,
    /// URL to `POST` after writing, to make the SUT reload its rules.
    pub reload_url: Option<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rules/alertcheck.json"),
            reload_url: None,
        }
    }
}

/// Poll cadence and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between polls of one scenario.
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Attempts per call before the scenario is failed.
    pub max_retries: u32,
    /// Pause between attempts in milliseconds.
    pub retry_backoff_millis: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            request_timeout_secs: 10,
            max_retries: 3,
            retry_backoff_millis: 500,
        }
    }
}

impl PollingConfig {
    /// Returns the poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the pause between attempts.
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_millis)
    }
}

/// Main driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverConfig {
    /// Prometheus remote-write endpoint.
    pub remote_write_url: String,
    /// Base URL of the query API (`/api/v1/...` is appended).
    pub query_base_url: String,
    /// Rule file settings.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(DriverError::Config(format!("{field} cannot be empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(DriverError::Config(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl DriverConfig {
    /// Creates a configuration with default rules and polling sections.
    pub fn new(remote_write_url: impl Into<String>, query_base_url: impl Into<String>) -> Self {
        Self {
            remote_write_url: remote_write_url.into(),
            query_base_url: query_base_url.into(),
            rules: RulesConfig::default(),
            polling: PollingConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DriverError::Config(format!(
                "failed to read config file '{}': {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DriverError::Config(format!("invalid TOML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range.
    pub fn validate(&self) -> Result<()> {
        validate_url("remote_write_url", &self.remote_write_url)?;
        validate_url("query_base_url", &self.query_base_url)?;
        if let Some(url) = &self.rules.reload_url {
            validate_url("rules.reload_url", url)?;
        }

        if self.rules.path.as_os_str().is_empty() {
            return Err(DriverError::Config("rules.path cannot be empty".to_string()));
        }

        if self.polling.poll_interval_secs == 0 {
            return Err(DriverError::Config(
                "polling.poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.polling.request_timeout_secs == 0 {
            return Err(DriverError::Config(
                "polling.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.polling.max_retries == 0 {
            return Err(DriverError::Config(
                "polling.max_retries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
