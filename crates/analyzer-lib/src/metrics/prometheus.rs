//! Prometheus HTTP API metrics provider

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::{async_trait, MetricsProvider, QueryValue};
use crate::error::{AnalyzerError, Result};

/// Envelope of a Prometheus query response
#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<QueryValue>,
}

/// Metrics provider backed by the Prometheus HTTP API
pub struct PrometheusProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl PrometheusProvider {
    /// Create a provider for the given Prometheus endpoint
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AnalyzerError::Query(format!("failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| AnalyzerError::Query(format!("invalid Prometheus URL: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Evaluate an expression against `/api/v1/query`.
    ///
    /// Range-shaped expressions (subqueries, range selectors) come back as a
    /// matrix from the same endpoint, so both trait entry points land here.
    async fn query(&self, expr: &str, at: DateTime<Utc>) -> Result<QueryValue> {
        let url = self
            .base_url
            .join("api/v1/query")
            .map_err(|e| AnalyzerError::Query(format!("invalid query path: {e}")))?;

        tracing::debug!(expr, "executing metrics query");

        let response = self
            .client
            .get(url)
            .query(&[("query", expr), ("time", &at.timestamp().to_string())])
            .send()
            .await
            .map_err(|e| AnalyzerError::Query(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Query(format!(
                "backend returned {status}: {body}"
            )));
        }

        let envelope: QueryResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Query(format!("malformed response: {e}")))?;

        if envelope.status != "success" {
            return Err(AnalyzerError::Query(
                envelope
                    .error
                    .unwrap_or_else(|| "query was not successful".to_string()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| AnalyzerError::Query("response carried no data".to_string()))
    }
}

#[async_trait]
impl MetricsProvider for PrometheusProvider {
    async fn instant_query(&self, expr: &str, at: DateTime<Utc>) -> Result<QueryValue> {
        self.query(expr, at).await
    }

    async fn range_query(&self, expr: &str, at: DateTime<Utc>) -> Result<QueryValue> {
        self.query(expr, at).await
    }
}
