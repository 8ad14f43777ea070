//! Analyzer configuration
//!
//! Loaded once at process start and passed into the engine by value; the
//! engine holds no mutable global state.

use serde::Deserialize;

use crate::error::Result;

/// Immutable analyzer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Cost of one CPU core in the billing currency
    #[serde(default = "default_cpu_cost_per_core")]
    pub cpu_cost_per_core: f64,

    /// Cost of one MB of memory in the billing currency
    #[serde(default = "default_memory_cost_per_mb")]
    pub memory_cost_per_mb: f64,

    /// Prometheus HTTP API endpoint
    #[serde(default = "default_prometheus_url")]
    pub prometheus_url: String,

    /// Namespace scanned for idle workloads
    #[serde(default = "default_idle_namespace")]
    pub idle_namespace: String,

    /// Upper bound on concurrent per-pod analyses
    #[serde(default = "default_analysis_concurrency")]
    pub analysis_concurrency: usize,
}

fn default_cpu_cost_per_core() -> f64 {
    1000.0
}

fn default_memory_cost_per_mb() -> f64 {
    0.1
}

fn default_prometheus_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_idle_namespace() -> String {
    "default".to_string()
}

fn default_analysis_concurrency() -> usize {
    8
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cpu_cost_per_core: default_cpu_cost_per_core(),
            memory_cost_per_mb: default_memory_cost_per_mb(),
            prometheus_url: default_prometheus_url(),
            idle_namespace: default_idle_namespace(),
            analysis_concurrency: default_analysis_concurrency(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from RIGHTSIZER_* environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RIGHTSIZER"))
            .build()
            .map_err(|e| crate::error::AnalyzerError::Validation(e.to_string()))?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
