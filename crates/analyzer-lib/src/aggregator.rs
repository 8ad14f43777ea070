//! Cluster-wide aggregation
//!
//! Enumerates every namespace and pod, analyzes each pod, and folds the
//! survivors into cluster totals and a cost-savings estimate. Aggregation
//! tolerates partial failure: a pod whose analysis fails is logged and
//! dropped, and a namespace whose pod listing fails is skipped; only a
//! failure of the namespace enumeration itself aborts the call.
//!
//! Per-pod analyses fan out over a semaphore-bounded task set. Results are
//! keyed by encounter index and sorted once after the join, so the output
//! ordering is deterministic regardless of completion order.

use std::cmp::Ordering;
use std::sync::Arc;

use kube::ResourceExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::collector::PodMetricsCollector;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::metrics::MetricsProvider;
use crate::models::{ClusterStats, PodMetrics};
use crate::orchestrator::OrchestrationClient;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const MILLICORES_PER_CORE: f64 = 1000.0;

/// Drives per-pod analysis across the whole cluster
pub struct ClusterAggregator {
    orchestrator: Arc<dyn OrchestrationClient>,
    collector: PodMetricsCollector,
    config: AnalyzerConfig,
}

impl ClusterAggregator {
    pub fn new(
        orchestrator: Arc<dyn OrchestrationClient>,
        metrics: Arc<dyn MetricsProvider>,
        config: AnalyzerConfig,
    ) -> Self {
        let collector = PodMetricsCollector::new(orchestrator.clone(), metrics);
        Self {
            orchestrator,
            collector,
            config,
        }
    }

    /// Analyze every pod in the cluster and aggregate the results.
    ///
    /// `total_pods` counts successfully analyzed pods; failed pods are
    /// excluded from the list and from every total.
    pub async fn cluster_stats(&self) -> Result<ClusterStats> {
        let namespaces = self.orchestrator.list_namespaces().await?;
        info!(count = namespaces.len(), "enumerated namespaces");

        let mut targets: Vec<(String, String)> = Vec::new();
        for namespace in namespaces {
            match self.orchestrator.list_pods(&namespace).await {
                Ok(pods) => {
                    debug!(namespace = %namespace, count = pods.len(), "enumerated pods");
                    for pod in pods {
                        targets.push((namespace.clone(), pod.name_any()));
                    }
                }
                Err(err) => {
                    warn!(namespace = %namespace, error = %err, "failed to list pods, skipping namespace");
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.analysis_concurrency.max(1)));
        let mut join_set = JoinSet::new();
        for (index, (namespace, pod_name)) in targets.iter().cloned().enumerate() {
            let collector = self.collector.clone();
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = collector.analyze(&namespace, &pod_name).await;
                (index, namespace, pod_name, result)
            });
        }

        // Encounter-order slots keep the output independent of completion
        // order and make the later sort stable with respect to it
        let mut slots: Vec<Option<PodMetrics>> = vec![None; targets.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, _, _, Ok(metrics))) => slots[index] = Some(metrics),
                Ok((_, namespace, pod_name, Err(err))) => {
                    warn!(namespace = %namespace, pod = %pod_name, error = %err, "analysis failed, excluding pod");
                }
                Err(err) => warn!(error = %err, "analysis task aborted"),
            }
        }

        let mut pods: Vec<PodMetrics> = slots.into_iter().flatten().collect();

        let mut stats = ClusterStats::default();
        for metrics in &pods {
            stats.total_current_cpu += metrics.current_cpu;
            stats.total_current_memory += metrics.current_memory;
            stats.total_max_cpu += metrics.max_cpu;
            stats.total_max_memory += metrics.max_memory;
            stats.total_recommend_cpu += metrics.recommend_cpu;
            stats.total_recommend_memory += metrics.recommend_memory;
        }

        pods.sort_by(|a, b| {
            b.optimization_score
                .partial_cmp(&a.optimization_score)
                .unwrap_or(Ordering::Equal)
        });

        stats.total_pods = pods.len();
        stats.potential_savings = potential_savings(&stats, &self.config);
        stats.pods = pods;

        info!(
            pods = stats.total_pods,
            savings = stats.potential_savings,
            "cluster stats computed"
        );
        Ok(stats)
    }
}

/// Cost delta between the current allocation and the recommendation.
/// Positive means the current allocation is more expensive; negative means
/// the recommendation would cost more.
fn potential_savings(stats: &ClusterStats, config: &AnalyzerConfig) -> f64 {
    let cpu_delta_cores =
        (stats.total_current_cpu - stats.total_recommend_cpu) / MILLICORES_PER_CORE;
    let memory_delta_mb =
        (stats.total_current_memory - stats.total_recommend_memory) / BYTES_PER_MB;
    cpu_delta_cores * config.cpu_cost_per_core + memory_delta_mb * config.memory_cost_per_mb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{container_with_limits, pod, FakeMetrics, FakeOrchestrator, FakeResponse};
    use std::collections::HashMap;

    const MIB: f64 = 1024.0 * 1024.0;

    fn limited_pod(name: &str, namespace: &str, cpu: &str, memory: &str) -> k8s_openapi::api::core::v1::Pod {
        pod(
            name,
            namespace,
            vec![container_with_limits("app", Some(cpu), Some(memory))],
            vec![],
        )
    }

    fn three_namespace_cluster() -> FakeOrchestrator {
        FakeOrchestrator {
            namespaces: vec!["alpha".into(), "beta".into(), "gamma".into()],
            pods: HashMap::from([
                (
                    "alpha".to_string(),
                    vec![limited_pod("a-1", "alpha", "2", "1Gi")],
                ),
                (
                    "beta".to_string(),
                    vec![
                        limited_pod("b-1", "beta", "1", "512Mi"),
                        limited_pod("b-2", "beta", "500m", "256Mi"),
                    ],
                ),
                (
                    "gamma".to_string(),
                    vec![limited_pod("g-1", "gamma", "250m", "128Mi")],
                ),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_single_pod_failure_excluded_from_totals() {
        let orchestrator = Arc::new(three_namespace_cluster());
        // b-2's CPU query fails; every other pod observes 100m / 64Mi peaks
        let metrics = Arc::new(
            FakeMetrics::new()
                .with_rule("pod=\"b-2\"", FakeResponse::Fail)
                .with_rule("container_cpu_usage_seconds_total", FakeResponse::Value(100.0))
                .with_rule(
                    "container_memory_usage_bytes",
                    FakeResponse::Value(64.0 * MIB),
                ),
        );

        let aggregator =
            ClusterAggregator::new(orchestrator, metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();

        assert_eq!(stats.total_pods, 3);
        assert_eq!(stats.pods.len(), 3);
        assert!(stats.pods.iter().all(|p| p.pod_name != "b-2"));
        // b-2's declared 500m is not part of the totals
        assert_eq!(stats.total_current_cpu, 2000.0 + 1000.0 + 250.0);
    }

    #[tokio::test]
    async fn test_pods_sorted_descending_by_score() {
        let orchestrator = Arc::new(three_namespace_cluster());
        let metrics = Arc::new(
            FakeMetrics::new()
                .with_rule("container_cpu_usage_seconds_total", FakeResponse::Value(100.0))
                .with_rule(
                    "container_memory_usage_bytes",
                    FakeResponse::Value(64.0 * MIB),
                ),
        );

        let aggregator =
            ClusterAggregator::new(orchestrator, metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();

        for window in stats.pods.windows(2) {
            assert!(window[0].optimization_score >= window[1].optimization_score);
        }
        // The most over-provisioned pod (2 cores declared, 100m observed)
        // sorts first
        assert_eq!(stats.pods[0].pod_name, "a-1");
    }

    #[tokio::test]
    async fn test_tied_scores_keep_encounter_order() {
        let orchestrator = Arc::new(FakeOrchestrator {
            namespaces: vec!["default".into()],
            pods: HashMap::from([(
                "default".to_string(),
                vec![
                    limited_pod("first", "default", "1", "256Mi"),
                    limited_pod("second", "default", "1", "256Mi"),
                    limited_pod("third", "default", "1", "256Mi"),
                ],
            )]),
            ..Default::default()
        });
        let metrics = Arc::new(
            FakeMetrics::new()
                .with_rule("container_cpu_usage_seconds_total", FakeResponse::Value(100.0))
                .with_rule(
                    "container_memory_usage_bytes",
                    FakeResponse::Value(64.0 * MIB),
                ),
        );

        let aggregator =
            ClusterAggregator::new(orchestrator, metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();

        let names: Vec<&str> = stats.pods.iter().map(|p| p.pod_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_broken_namespace_is_skipped() {
        let mut orchestrator = three_namespace_cluster();
        orchestrator.broken_namespaces.push("beta".into());
        let metrics = Arc::new(
            FakeMetrics::new()
                .with_rule("container_cpu_usage_seconds_total", FakeResponse::Value(100.0))
                .with_rule(
                    "container_memory_usage_bytes",
                    FakeResponse::Value(64.0 * MIB),
                ),
        );

        let aggregator =
            ClusterAggregator::new(Arc::new(orchestrator), metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();

        assert_eq!(stats.total_pods, 2);
        assert!(stats.pods.iter().all(|p| p.namespace != "beta"));
    }

    #[tokio::test]
    async fn test_savings_sign_follows_cost_delta() {
        // One pod, heavily over-provisioned: savings must be positive
        let orchestrator = Arc::new(FakeOrchestrator::with_pods(
            "default",
            vec![limited_pod("big", "default", "4", "4Gi")],
        ));
        let metrics = Arc::new(
            FakeMetrics::new()
                .with_rule("container_cpu_usage_seconds_total", FakeResponse::Value(100.0))
                .with_rule(
                    "container_memory_usage_bytes",
                    FakeResponse::Value(64.0 * MIB),
                ),
        );

        let aggregator =
            ClusterAggregator::new(orchestrator, metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();
        assert!(stats.potential_savings > 0.0);

        // One pod with no limits but real usage: recommendation costs more
        let orchestrator = Arc::new(FakeOrchestrator::with_pods(
            "default",
            vec![pod(
                "tiny",
                "default",
                vec![container_with_limits("app", None, None)],
                vec![],
            )],
        ));
        let metrics = Arc::new(
            FakeMetrics::new()
                .with_rule("container_cpu_usage_seconds_total", FakeResponse::Value(500.0))
                .with_rule(
                    "container_memory_usage_bytes",
                    FakeResponse::Value(256.0 * MIB),
                ),
        );

        let aggregator =
            ClusterAggregator::new(orchestrator, metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();
        assert!(stats.potential_savings < 0.0);
    }

    #[tokio::test]
    async fn test_empty_cluster_yields_empty_stats() {
        let orchestrator = Arc::new(FakeOrchestrator {
            namespaces: vec!["default".into()],
            ..Default::default()
        });
        let metrics = Arc::new(FakeMetrics::new());

        let aggregator =
            ClusterAggregator::new(orchestrator, metrics, AnalyzerConfig::default());
        let stats = aggregator.cluster_stats().await.unwrap();

        assert_eq!(stats.total_pods, 0);
        assert_eq!(stats.potential_savings, 0.0);
        assert!(stats.pods.is_empty());
    }
}
