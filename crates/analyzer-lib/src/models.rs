//! Core data models for the rightsizing analyzer
//!
//! JSON field names on these types are part of the consumer-facing contract
//! and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-pod resource usage and recommendation
///
/// CPU values are millicores, memory values are bytes. `current_*` sums the
/// declared container limits; `max_*` is the observed peak utilization. The
/// optimization score is a signed ratio: values near 1 indicate heavy
/// over-provisioning, zero or negative values a pod at or under its
/// recommended sizing. It is not bounded to [0, 1].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodMetrics {
    pub pod_name: String,
    pub namespace: String,
    pub current_cpu: f64,
    pub current_memory: f64,
    pub max_cpu: f64,
    pub max_memory: f64,
    pub recommend_cpu: f64,
    pub recommend_memory: f64,
    pub optimization_score: f64,
}

/// Cluster-wide aggregation of per-pod analyses
///
/// `total_pods` counts the successfully analyzed pods, not every pod in the
/// cluster: pods whose analysis failed are excluded from the list and from
/// all totals. `pods` is sorted non-increasing by optimization score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterStats {
    pub total_pods: usize,
    pub total_current_cpu: f64,
    pub total_current_memory: f64,
    pub total_max_cpu: f64,
    pub total_max_memory: f64,
    pub total_recommend_cpu: f64,
    pub total_recommend_memory: f64,
    pub potential_savings: f64,
    pub pods: Vec<PodMetrics>,
}

/// A request to change a workload's resource declarations
///
/// CPU is millicores, memory and storage are bytes. A zero or absent value
/// means "do not change this field", never "set to zero".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub pod_name: String,
    pub namespace: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: f64,
    #[serde(default)]
    pub storage: f64,
}

/// A container with no observed inbound network activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadContainer {
    pub pod_name: String,
    pub namespace: String,
    pub container_name: String,
    /// Inferred owning-workload kind (Deployment, StatefulSet, ...)
    pub pod_type: String,
    /// Timestamp of the last inbound-byte counter sample, absent if the
    /// container was never observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    pub network_in_bytes: f64,
    pub network_out_bytes: f64,
}
