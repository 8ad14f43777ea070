//! Workload orchestration capability
//!
//! A narrow interface over the cluster's workload objects: everything the
//! analyzer needs to enumerate pods, resolve owner chains, and persist
//! resource changes, and nothing more. Components depend on this trait, so
//! tests swap in in-memory fakes without a live cluster.

mod kube_client;

pub use kube_client::KubeOrchestrator;

use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::Pod;

use crate::error::Result;

pub use async_trait::async_trait;

/// Capability interface for the orchestration backend
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    /// Names of all namespaces in the cluster
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// All pods in a namespace
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>>;

    /// A single pod by name
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod>;

    /// A replica set by name, used for owner-chain resolution
    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet>;

    /// A deployment by name
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment>;

    /// Replace a deployment; the backend's resourceVersion check rejects
    /// stale writes
    async fn update_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<()>;

    /// A stateful set by name
    async fn get_stateful_set(&self, namespace: &str, name: &str) -> Result<StatefulSet>;

    /// Replace a stateful set; same optimistic-concurrency semantics as
    /// deployments
    async fn update_stateful_set(&self, namespace: &str, stateful_set: &StatefulSet)
        -> Result<()>;
}
