//! Metrics backend capability and result model
//!
//! The analyzer asks the monitoring backend two kinds of questions: instant
//! queries (a single sample per series, evaluated at one timestamp) and
//! range queries (bucketed series over a window carried by the expression).
//! The backend's dynamically-typed result payload is decoded exactly once,
//! here, into the [`QueryValue`] tagged enum; everything past this boundary
//! works with typed values.

mod prometheus;

pub use prometheus::PrometheusProvider;

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::Result;

pub use async_trait::async_trait;

/// Capability interface for the monitoring backend
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Evaluate an expression at a single timestamp, yielding at most one
    /// sample per series
    async fn instant_query(&self, expr: &str, at: DateTime<Utc>) -> Result<QueryValue>;

    /// Evaluate an expression whose window yields bucketed series
    async fn range_query(&self, expr: &str, at: DateTime<Utc>) -> Result<QueryValue>;
}

/// A decoded query result, discriminated by the backend's result type
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
pub enum QueryValue {
    /// Instant vector: one sample per matching series
    Vector(Vec<InstantSample>),
    /// Range matrix: bucketed samples per matching series
    Matrix(Vec<RangeSeries>),
    /// A single scalar sample
    Scalar(Sample),
}

impl QueryValue {
    /// First sample of the result, if any
    pub fn first_sample(&self) -> Option<&Sample> {
        match self {
            QueryValue::Vector(samples) => samples.first().map(|s| &s.value),
            QueryValue::Matrix(series) => series.first().and_then(|s| s.values.first()),
            QueryValue::Scalar(sample) => Some(sample),
        }
    }

    /// Value of the first sample; an empty result reads as zero, not as an
    /// error
    pub fn value_or_zero(&self) -> f64 {
        self.first_sample().map(|s| s.value()).unwrap_or(0.0)
    }

    /// Timestamp of the first sample, if any
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.first_sample().and_then(Sample::timestamp)
    }
}

/// One sample of an instant vector
#[derive(Debug, Clone, Deserialize)]
pub struct InstantSample {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    pub value: Sample,
}

/// One series of a range matrix
#[derive(Debug, Clone, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    pub values: Vec<Sample>,
}

/// A (unix seconds, value) pair; the backend encodes the value as a string
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Sample(pub f64, #[serde(deserialize_with = "f64_from_string")] pub f64);

impl Sample {
    pub fn value(&self) -> f64 {
        self.1
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = self.0.trunc() as i64;
        let nanos = (self.0.fract() * 1e9) as u32;
        Utc.timestamp_opt(secs, nanos).single()
    }
}

fn f64_from_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Expression builders for the analyzer's fixed queries
pub mod promql {
    /// Smoothing window for rate queries
    pub const RATE_WINDOW: &str = "5m";

    /// Lookback window for idle detection
    pub const IDLE_LOOKBACK: &str = "12h";

    /// Peak 5-minute CPU usage rate of a pod, in millicores
    pub fn pod_cpu_peak(pod: &str, namespace: &str) -> String {
        format!(
            "max(rate(container_cpu_usage_seconds_total{{pod=\"{pod}\",namespace=\"{namespace}\"}}[{RATE_WINDOW}]) * 1000)"
        )
    }

    /// Peak instantaneous memory usage of a pod, in bytes
    pub fn pod_memory_peak(pod: &str, namespace: &str) -> String {
        format!("max(container_memory_usage_bytes{{pod=\"{pod}\",namespace=\"{namespace}\"}})")
    }

    /// Maximum inbound network byte rate of a container over the idle
    /// lookback window
    pub fn container_receive_rate_peak(pod: &str, namespace: &str, container: &str) -> String {
        format!(
            "max_over_time(rate(container_network_receive_bytes_total{{pod=\"{pod}\",namespace=\"{namespace}\",container=\"{container}\"}}[{RATE_WINDOW}])[{IDLE_LOOKBACK}:])"
        )
    }

    /// Last known cumulative inbound-byte counter of a container
    pub fn container_receive_total(pod: &str, namespace: &str, container: &str) -> String {
        format!(
            "max(container_network_receive_bytes_total{{pod=\"{pod}\",namespace=\"{namespace}\",container=\"{container}\"}})"
        )
    }
}
