//! Per-pod metrics collection
//!
//! Combines the pod's declared container limits (summed, unit-normalized)
//! with its observed peak utilization from the metrics backend. Declared
//! values are *limits*, not requests; a container with no explicit limit
//! contributes zero. Observed peaks are single-sample instant queries
//! evaluated at now; an empty result reads as zero.

use std::sync::Arc;

use chrono::Utc;
use k8s_openapi::api::core::v1::Pod;

use crate::error::Result;
use crate::metrics::{promql, MetricsProvider};
use crate::models::PodMetrics;
use crate::orchestrator::OrchestrationClient;
use crate::{quantity, recommender};

/// Collects declared and observed resource figures for one pod
#[derive(Clone)]
pub struct PodMetricsCollector {
    orchestrator: Arc<dyn OrchestrationClient>,
    metrics: Arc<dyn MetricsProvider>,
}

impl PodMetricsCollector {
    pub fn new(
        orchestrator: Arc<dyn OrchestrationClient>,
        metrics: Arc<dyn MetricsProvider>,
    ) -> Self {
        Self {
            orchestrator,
            metrics,
        }
    }

    /// Fetch declared limits and observed peaks for a pod.
    ///
    /// The returned record has its recommendation fields zeroed; callers
    /// that want a scored recommendation use [`analyze`](Self::analyze).
    pub async fn collect(&self, namespace: &str, pod_name: &str) -> Result<PodMetrics> {
        let pod = self.orchestrator.get_pod(namespace, pod_name).await?;
        let (current_cpu, current_memory) = declared_limits(&pod);

        let now = Utc::now();
        let cpu_peak = self
            .metrics
            .instant_query(&promql::pod_cpu_peak(pod_name, namespace), now)
            .await?;
        let memory_peak = self
            .metrics
            .instant_query(&promql::pod_memory_peak(pod_name, namespace), now)
            .await?;

        Ok(PodMetrics {
            pod_name: pod_name.to_string(),
            namespace: namespace.to_string(),
            current_cpu,
            current_memory,
            max_cpu: cpu_peak.value_or_zero(),
            max_memory: memory_peak.value_or_zero(),
            ..Default::default()
        })
    }

    /// Collect and score in one step
    pub async fn analyze(&self, namespace: &str, pod_name: &str) -> Result<PodMetrics> {
        let mut metrics = self.collect(namespace, pod_name).await?;
        recommender::apply_recommendation(&mut metrics);
        Ok(metrics)
    }
}

/// Sum the declared container limits of a pod: CPU in millicores, memory in
/// bytes. Missing or unparseable limits contribute zero.
fn declared_limits(pod: &Pod) -> (f64, f64) {
    let mut cpu = 0.0;
    let mut memory = 0.0;

    let Some(spec) = &pod.spec else {
        return (cpu, memory);
    };

    for container in &spec.containers {
        let Some(limits) = container.resources.as_ref().and_then(|r| r.limits.as_ref()) else {
            continue;
        };
        if let Some(q) = limits.get("cpu") {
            cpu += quantity::parse_cpu_millicores(&q.0).unwrap_or(0.0);
        }
        if let Some(q) = limits.get("memory") {
            memory += quantity::parse_memory_bytes(&q.0).unwrap_or(0.0);
        }
    }

    (cpu, memory)
}
