//! CLI command implementations

pub mod analyze;
pub mod apply;
pub mod idle;

use std::sync::Arc;

use analyzer_lib::{
    AnalyzerConfig, KubeOrchestrator, MetricsProvider, OrchestrationClient, PrometheusProvider,
};
use anyhow::{Context as _, Result};

/// Shared handles the commands run against
pub struct Context {
    pub orchestrator: Arc<dyn OrchestrationClient>,
    pub metrics: Arc<dyn MetricsProvider>,
    pub config: AnalyzerConfig,
}

impl Context {
    /// Connect to the cluster and the metrics backend
    pub async fn connect(config: AnalyzerConfig) -> Result<Self> {
        let orchestrator = KubeOrchestrator::try_default()
            .await
            .context("failed to connect to the Kubernetes API")?;
        let metrics = PrometheusProvider::new(&config.prometheus_url)
            .context("failed to set up the Prometheus client")?;

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            metrics: Arc::new(metrics),
            config,
        })
    }
}
