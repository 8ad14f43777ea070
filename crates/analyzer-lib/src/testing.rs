//! In-memory fakes for the two capability traits, shared across module
//! tests

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, ReplicaSet, StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodTemplateSpec, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

use crate::error::{AnalyzerError, Result};
use crate::metrics::{async_trait, InstantSample, MetricsProvider, QueryValue, Sample};
use crate::orchestrator::OrchestrationClient;

// ---------------------------------------------------------------------
// Orchestration fake
// ---------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeOrchestrator {
    pub namespaces: Vec<String>,
    pub pods: HashMap<String, Vec<Pod>>,
    pub replica_sets: HashMap<(String, String), ReplicaSet>,
    pub deployments: HashMap<(String, String), Deployment>,
    pub stateful_sets: HashMap<(String, String), StatefulSet>,
    /// Namespaces whose pod listing fails
    pub broken_namespaces: Vec<String>,
    /// Reject updates with a version conflict
    pub conflict_on_update: bool,
    /// Record of applied updates, most recent last
    pub updates: Mutex<Vec<AppliedUpdate>>,
}

#[derive(Debug, Clone)]
pub(crate) enum AppliedUpdate {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
}

impl FakeOrchestrator {
    pub fn with_pods(namespace: &str, pods: Vec<Pod>) -> Self {
        Self {
            namespaces: vec![namespace.to_string()],
            pods: HashMap::from([(namespace.to_string(), pods)]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl OrchestrationClient for FakeOrchestrator {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(self.namespaces.clone())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        if self.broken_namespaces.iter().any(|ns| ns == namespace) {
            return Err(AnalyzerError::Query(format!(
                "listing pods in {namespace} failed"
            )));
        }
        Ok(self.pods.get(namespace).cloned().unwrap_or_default())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        self.pods
            .get(namespace)
            .and_then(|pods| {
                pods.iter()
                    .find(|p| p.metadata.name.as_deref() == Some(name))
            })
            .cloned()
            .ok_or_else(|| AnalyzerError::not_found("Pod", namespace, name))
    }

    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet> {
        self.replica_sets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| AnalyzerError::not_found("ReplicaSet", namespace, name))
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        self.deployments
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| AnalyzerError::not_found("Deployment", namespace, name))
    }

    async fn update_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<()> {
        if self.conflict_on_update {
            return Err(AnalyzerError::Conflict {
                kind: "Deployment",
                namespace: namespace.to_string(),
                name: deployment.metadata.name.clone().unwrap_or_default(),
            });
        }
        self.updates
            .lock()
            .unwrap()
            .push(AppliedUpdate::Deployment(deployment.clone()));
        Ok(())
    }

    async fn get_stateful_set(&self, namespace: &str, name: &str) -> Result<StatefulSet> {
        self.stateful_sets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| AnalyzerError::not_found("StatefulSet", namespace, name))
    }

    async fn update_stateful_set(
        &self,
        namespace: &str,
        stateful_set: &StatefulSet,
    ) -> Result<()> {
        if self.conflict_on_update {
            return Err(AnalyzerError::Conflict {
                kind: "StatefulSet",
                namespace: namespace.to_string(),
                name: stateful_set.metadata.name.clone().unwrap_or_default(),
            });
        }
        self.updates
            .lock()
            .unwrap()
            .push(AppliedUpdate::StatefulSet(stateful_set.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Metrics fake
// ---------------------------------------------------------------------

pub(crate) enum FakeResponse {
    /// A one-sample vector with the given value
    Value(f64),
    /// A one-sample vector with value and unix timestamp
    ValueAt(f64, f64),
    /// An empty vector
    Empty,
    /// A failing query
    Fail,
}

/// Metrics provider that answers by first matching expression substring
#[derive(Default)]
pub(crate) struct FakeMetrics {
    rules: Vec<(String, FakeResponse)>,
}

impl FakeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, expr_contains: &str, response: FakeResponse) -> Self {
        self.rules.push((expr_contains.to_string(), response));
        self
    }

    fn answer(&self, expr: &str) -> Result<QueryValue> {
        for (needle, response) in &self.rules {
            if !expr.contains(needle.as_str()) {
                continue;
            }
            return match response {
                FakeResponse::Value(v) => Ok(vector_of(*v, 1_712_000_000.0)),
                FakeResponse::ValueAt(v, ts) => Ok(vector_of(*v, *ts)),
                FakeResponse::Empty => Ok(QueryValue::Vector(vec![])),
                FakeResponse::Fail => Err(AnalyzerError::Query(format!(
                    "simulated failure for {expr}"
                ))),
            };
        }
        Ok(QueryValue::Vector(vec![]))
    }
}

fn vector_of(value: f64, timestamp: f64) -> QueryValue {
    QueryValue::Vector(vec![InstantSample {
        metric: HashMap::new(),
        value: Sample(timestamp, value),
    }])
}

#[async_trait]
impl MetricsProvider for FakeMetrics {
    async fn instant_query(&self, expr: &str, _at: DateTime<Utc>) -> Result<QueryValue> {
        self.answer(expr)
    }

    async fn range_query(&self, expr: &str, _at: DateTime<Utc>) -> Result<QueryValue> {
        self.answer(expr)
    }
}

// ---------------------------------------------------------------------
// Object builders
// ---------------------------------------------------------------------

pub(crate) fn owner_ref(kind: &str, name: &str) -> OwnerReference {
    OwnerReference {
        api_version: "apps/v1".to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        uid: format!("uid-{name}"),
        controller: Some(true),
        ..Default::default()
    }
}

pub(crate) fn container_with_limits(
    name: &str,
    cpu: Option<&str>,
    memory: Option<&str>,
) -> Container {
    let mut limits = BTreeMap::new();
    if let Some(cpu) = cpu {
        limits.insert("cpu".to_string(), Quantity(cpu.to_string()));
    }
    if let Some(memory) = memory {
        limits.insert("memory".to_string(), Quantity(memory.to_string()));
    }

    Container {
        name: name.to_string(),
        resources: Some(ResourceRequirements {
            limits: (!limits.is_empty()).then_some(limits),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn pod(
    name: &str,
    namespace: &str,
    containers: Vec<Container>,
    owners: Vec<OwnerReference>,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: (!owners.is_empty()).then_some(owners),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn replica_set(name: &str, namespace: &str, owners: Vec<OwnerReference>) -> ReplicaSet {
    ReplicaSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: (!owners.is_empty()).then_some(owners),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub(crate) fn deployment(name: &str, namespace: &str, containers: Vec<Container>) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            template: pod_template(containers),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn stateful_set(name: &str, namespace: &str, containers: Vec<Container>) -> StatefulSet {
    StatefulSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            template: pod_template(containers),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn pod_template(containers: Vec<Container>) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: None,
        spec: Some(PodSpec {
            containers,
            ..Default::default()
        }),
    }
}
