//! HTTP transports for a Prometheus-compatible system under test.

use std::path::PathBuf;
use std::time::Duration;

use alertcheck_cases::types::parse_value;
use alertcheck_cases::{AlertState, InstantSample, ObservedAlert, RuleFile};
use alertcheck_series::{LabelSet, TimeSeries};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DriverError, Result};
use crate::remote_write::{self, WriteRequest};
use crate::transport::{AlertSource, Ingestor, RuleLoader, TransportFuture};

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DriverError::Config(format!("failed to build HTTP client: {e}")))
}

fn request_error(operation: &'static str, err: &reqwest::Error) -> DriverError {
    if err.is_timeout() {
        DriverError::transport(operation, "request timed out")
    } else {
        DriverError::transport(operation, err.to_string())
    }
}

async fn expect_success(operation: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DriverError::transport(
        operation,
        format!("HTTP {status}: {}", body.trim()),
    ))
}

/// Pushes series over Prometheus remote write.
#[derive(Debug, Clone)]
pub struct RemoteWriteClient {
    client: reqwest::Client,
    url: String,
}

impl RemoteWriteClient {
    /// Creates a client for the remote-write endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Config` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }
}

impl Ingestor for RemoteWriteClient {
    fn push<'a>(&'a self, series: &'a [TimeSeries]) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            const OP: &str = "remote write";

            let body = WriteRequest::from_series(series).to_body()?;
            let samples: usize = series.iter().map(|s| s.samples.len()).sum();
            debug!(url = %self.url, series = series.len(), samples, "Pushing series");

            let response = self
                .client
                .post(&self.url)
                .header(reqwest::header::CONTENT_ENCODING, remote_write::CONTENT_ENCODING)
                .header(reqwest::header::CONTENT_TYPE, remote_write::CONTENT_TYPE)
                .header(remote_write::VERSION_HEADER, remote_write::PROTOCOL_VERSION)
                .body(body)
                .send()
                .await
                .map_err(|e| request_error(OP, &e))?;
            expect_success(OP, response).await?;
            Ok(())
        })
    }
}

/// The `{status, data}` envelope every query API response uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse<T> {
    status: String,
    data: Option<T>,
    error_type: Option<String>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_data(self, operation: &'static str) -> Result<T> {
        if self.status != "success" {
            return Err(DriverError::transport(
                operation,
                format!(
                    "{}: {}",
                    self.error_type.as_deref().unwrap_or("error"),
                    self.error.as_deref().unwrap_or("no detail")
                ),
            ));
        }
        self.data
            .ok_or_else(|| DriverError::transport(operation, "response has no data"))
    }
}

#[derive(Debug, Deserialize)]
struct AlertsData {
    alerts: Vec<ApiAlert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAlert {
    labels: LabelSet,
    #[serde(default)]
    annotations: LabelSet,
    state: AlertState,
    active_at: Option<DateTime<Utc>>,
    value: String,
}

impl ApiAlert {
    fn into_observed(self) -> ObservedAlert {
        ObservedAlert {
            labels: self.labels,
            annotations: self.annotations,
            state: self.state,
            active_at: self.active_at.map_or(0, |t| t.timestamp_millis()),
            value: self.value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    result_type: String,
    result: Vec<VectorSample>,
}

#[derive(Debug, Deserialize)]
struct VectorSample {
    metric: LabelSet,
    value: (f64, String),
}

impl VectorSample {
    fn into_sample(self, operation: &'static str) -> Result<InstantSample> {
        let (secs, raw) = self.value;
        let value = parse_value(&raw).ok_or_else(|| {
            DriverError::transport(operation, format!("unparsable sample value '{raw}'"))
        })?;
        Ok(InstantSample::new(
            self.metric,
            (secs * 1000.0).round() as i64,
            value,
        ))
    }
}

/// Formats Unix millis as the fractional seconds the query API takes.
fn format_query_time(timestamp: i64) -> String {
    format!("{}.{:03}", timestamp.div_euclid(1000), timestamp.rem_euclid(1000))
}

/// Reads alerts and instant-query results from the query API.
#[derive(Debug, Clone)]
pub struct QueryApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl QueryApiClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| request_error(operation, &e))?;
        let response = expect_success(operation, response).await?;
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| DriverError::transport(operation, format!("invalid response: {e}")))?;
        envelope.into_data(operation)
    }
}

impl AlertSource for QueryApiClient {
    fn alerts(&self) -> TransportFuture<'_, Vec<ObservedAlert>> {
        Box::pin(async move {
            let data: AlertsData = self.get("list alerts", "/api/v1/alerts", &[]).await?;
            Ok(data.alerts.into_iter().map(ApiAlert::into_observed).collect())
        })
    }

    fn query<'a>(&'a self, expr: &'a str, timestamp: i64) -> TransportFuture<'a, Vec<InstantSample>> {
        Box::pin(async move {
            const OP: &str = "instant query";

            let time = format_query_time(timestamp);
            let data: QueryData = self
                .get(OP, "/api/v1/query", &[("query", expr), ("time", time.as_str())])
                .await?;
            if data.result_type != "vector" {
                return Err(DriverError::transport(
                    OP,
                    format!("expected a vector result, got {}", data.result_type),
                ));
            }
            data.result
                .into_iter()
                .map(|sample| sample.into_sample(OP))
                .collect()
        })
    }
}

/// Writes the rule document to disk and optionally triggers a reload.
#[derive(Debug, Clone)]
pub struct FileRuleLoader {
    path: PathBuf,
    reload: Option<(reqwest::Client, String)>,
}

impl FileRuleLoader {
    /// Creates a loader that only writes the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reload: None,
        }
    }

    /// Also `POST`s to `url` after every write.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Config` if the HTTP client cannot be built.
    pub fn with_reload(mut self, url: impl Into<String>, timeout: Duration) -> Result<Self> {
        self.reload = Some((build_client(timeout)?, url.into()));
        Ok(self)
    }

    /// Returns the rule file path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl RuleLoader for FileRuleLoader {
    fn load<'a>(&'a self, rules: &'a RuleFile) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let document = rules.to_document()?;
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&self.path, document).await?;
            info!(
                path = %self.path.display(),
                groups = rules.groups.len(),
                rules = rules.rule_count(),
                "Wrote rule file"
            );

            if let Some((client, url)) = &self.reload {
                const OP: &str = "rule reload";
                let response = client
                    .post(url)
                    .send()
                    .await
                    .map_err(|e| request_error(OP, &e))?;
                expect_success(OP, response).await?;
                debug!(url = %url, "Triggered rule reload");
            }
            Ok(())
        })
    }
}
