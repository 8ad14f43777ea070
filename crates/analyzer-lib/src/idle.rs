//! Idle workload detection
//!
//! Scans one namespace for containers that received no inbound network
//! traffic over a long lookback window. Deadness is judged on inbound
//! traffic only: a container whose peak receive rate over the window is
//! zero, or that has no samples at all, is reported dead. Pods with no
//! owner reference are assumed to be one-off and skipped.

use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use tracing::{debug, warn};

use crate::error::Result;
use crate::metrics::{promql, MetricsProvider};
use crate::models::DeadContainer;
use crate::orchestrator::OrchestrationClient;

/// Finds containers with no recent inbound network activity
pub struct IdleWorkloadDetector {
    orchestrator: Arc<dyn OrchestrationClient>,
    metrics: Arc<dyn MetricsProvider>,
    namespace: String,
}

impl IdleWorkloadDetector {
    pub fn new(
        orchestrator: Arc<dyn OrchestrationClient>,
        metrics: Arc<dyn MetricsProvider>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            metrics,
            namespace: namespace.into(),
        }
    }

    /// Scan the namespace and report every container whose peak inbound
    /// rate over the lookback window is zero.
    ///
    /// Containers whose queries fail are skipped with a warning rather
    /// than failing the whole scan.
    pub async fn find_dead_containers(&self) -> Result<Vec<DeadContainer>> {
        let pods = self.orchestrator.list_pods(&self.namespace).await?;
        let now = chrono::Utc::now();
        let mut dead = Vec::new();

        for pod in &pods {
            let owners = pod.metadata.owner_references.as_deref().unwrap_or(&[]);
            if owners.is_empty() {
                debug!(
                    namespace = %self.namespace,
                    pod = pod.metadata.name.as_deref().unwrap_or_default(),
                    "skipping unowned pod"
                );
                continue;
            }
            let pod_name = match pod.metadata.name.as_deref() {
                Some(name) => name,
                None => continue,
            };
            let pod_type = self.infer_workload_kind(owners).await;

            for container in containers_of(pod) {
                let rate = match self
                    .metrics
                    .range_query(
                        &promql::container_receive_rate_peak(pod_name, &self.namespace, container),
                        now,
                    )
                    .await
                {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(
                            namespace = %self.namespace,
                            pod = %pod_name,
                            container = %container,
                            error = %err,
                            "receive rate query failed, skipping container"
                        );
                        continue;
                    }
                };

                let network_in = rate.value_or_zero();
                if network_in != 0.0 {
                    continue;
                }

                // The cumulative counter's timestamp tells us when the
                // container was last seen by the metrics backend
                let counter = match self
                    .metrics
                    .instant_query(
                        &promql::container_receive_total(pod_name, &self.namespace, container),
                        now,
                    )
                    .await
                {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(
                            namespace = %self.namespace,
                            pod = %pod_name,
                            container = %container,
                            error = %err,
                            "activity lookup failed, skipping container"
                        );
                        continue;
                    }
                };
                let last_activity = counter.first_timestamp();

                dead.push(DeadContainer {
                    pod_name: pod_name.to_string(),
                    namespace: self.namespace.clone(),
                    container_name: container.to_string(),
                    pod_type: pod_type.clone(),
                    last_activity,
                    network_in_bytes: network_in,
                    network_out_bytes: 0.0,
                });
            }
        }

        Ok(dead)
    }

    /// Name the workload kind behind a pod's owner chain.
    ///
    /// A ReplicaSet owner is followed one hop to whatever owns the
    /// ReplicaSet; any other owner kind is reported as-is. A ReplicaSet
    /// that cannot be fetched or has no owner of its own reads as
    /// "Unknown".
    async fn infer_workload_kind(&self, owners: &[OwnerReference]) -> String {
        let Some(owner) = owners.first() else {
            return "Unknown".to_string();
        };
        if owner.kind != "ReplicaSet" {
            return owner.kind.clone();
        }

        match self
            .orchestrator
            .get_replica_set(&self.namespace, &owner.name)
            .await
        {
            Ok(replica_set) => replica_set
                .metadata
                .owner_references
                .as_deref()
                .unwrap_or(&[])
                .first()
                .map(|r| r.kind.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            Err(err) => {
                warn!(
                    namespace = %self.namespace,
                    replica_set = %owner.name,
                    error = %err,
                    "owner lookup failed"
                );
                "Unknown".to_string()
            }
        }
    }
}

fn containers_of(pod: &Pod) -> impl Iterator<Item = &str> {
    pod.spec
        .iter()
        .flat_map(|s| s.containers.iter())
        .map(|c| c.name.as_str())
}
