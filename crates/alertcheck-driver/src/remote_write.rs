//! Prometheus remote-write 0.1.0 payloads.
//!
//! A `WriteRequest` protobuf, snappy block-compressed. Only the fields the
//! driver sends are declared; field numbers follow `prompb/remote.proto` and
//! `prompb/types.proto`.

use alertcheck_series::TimeSeries;
use prost::Message;

use crate::error::{DriverError, Result};

/// `Content-Encoding` of a remote-write body.
pub const CONTENT_ENCODING: &str = "snappy";
/// `Content-Type` of a remote-write body.
pub const CONTENT_TYPE: &str = "application/x-protobuf";
/// Value of the `X-Prometheus-Remote-Write-Version` header.
pub const PROTOCOL_VERSION: &str = "0.1.0";
/// Name of the protocol version header.
pub const VERSION_HEADER: &str = "X-Prometheus-Remote-Write-Version";

/// One label pair.
#[derive(Clone, PartialEq, Message)]
pub struct WireLabel {
    /// Label name.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Label value.
    #[prost(string, tag = "2")]
    pub value: String,
}

/// One sample.
#[derive(Clone, PartialEq, Message)]
pub struct WireSample {
    /// Sample value.
    #[prost(double, tag = "1")]
    pub value: f64,
    /// Unix millis.
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

/// One series with its samples.
#[derive(Clone, PartialEq, Message)]
pub struct WireTimeSeries {
    /// Labels, sorted by name.
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<WireLabel>,
    /// Samples in timestamp order.
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<WireSample>,
}

/// The remote-write request body before compression.
#[derive(Clone, PartialEq, Message)]
pub struct WriteRequest {
    /// Series in the batch.
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<WireTimeSeries>,
}

impl From<&TimeSeries> for WireTimeSeries {
    fn from(series: &TimeSeries) -> Self {
        Self {
            labels: series
                .labels
                .iter()
                .map(|(name, value)| WireLabel {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            samples: series
                .samples
                .iter()
                .map(|s| WireSample {
                    value: s.value,
                    timestamp: s.timestamp,
                })
                .collect(),
        }
    }
}

impl WriteRequest {
    /// Builds a request from a batch of series.
    #[must_use]
    pub fn from_series(series: &[TimeSeries]) -> Self {
        Self {
            timeseries: series.iter().map(WireTimeSeries::from).collect(),
        }
    }

    /// Encodes and snappy-compresses the request.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Transport` if compression fails.
    pub fn to_body(&self) -> Result<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(&self.encode_to_vec())
            .map_err(|e| DriverError::transport("remote write", format!("snappy: {e}")))
    }

    /// Decompresses and decodes a request body.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Transport` if the body is not a valid payload.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let raw = snap::raw::Decoder::new()
            .decompress_vec(body)
            .map_err(|e| DriverError::transport("remote write", format!("snappy: {e}")))?;
        Self::decode(raw.as_slice())
            .map_err(|e| DriverError::transport("remote write", format!("protobuf: {e}")))
    }
}
