//! Kubernetes API implementation of the orchestration capability

use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{Api, ListParams, PostParams};
use kube::{Client, ResourceExt};

use super::{async_trait, OrchestrationClient};
use crate::error::{AnalyzerError, Result};

/// Orchestration client backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeOrchestrator {
    client: Client,
}

impl KubeOrchestrator {
    /// Wrap an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the ambient kubeconfig or in-cluster environment
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    fn map_err(
        err: kube::Error,
        kind: &'static str,
        namespace: &str,
        name: &str,
    ) -> AnalyzerError {
        match err {
            kube::Error::Api(ref response) if response.code == 404 => {
                AnalyzerError::not_found(kind, namespace, name)
            }
            kube::Error::Api(ref response) if response.code == 409 => AnalyzerError::Conflict {
                kind,
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            other => AnalyzerError::Kube(other),
        }
    }
}

#[async_trait]
impl OrchestrationClient for KubeOrchestrator {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api.list(&ListParams::default()).await?;
        Ok(namespaces.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api
            .list(&ListParams::default())
            .await
            .map_err(|e| Self::map_err(e, "Namespace", namespace, namespace))?;
        Ok(pods.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_err(e, "Pod", namespace, name))
    }

    async fn get_replica_set(&self, namespace: &str, name: &str) -> Result<ReplicaSet> {
        let api: Api<ReplicaSet> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_err(e, "ReplicaSet", namespace, name))
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_err(e, "Deployment", namespace, name))
    }

    async fn update_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<()> {
        let name = deployment.name_any();
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&name, &PostParams::default(), deployment)
            .await
            .map_err(|e| Self::map_err(e, "Deployment", namespace, &name))?;
        Ok(())
    }

    async fn get_stateful_set(&self, namespace: &str, name: &str) -> Result<StatefulSet> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| Self::map_err(e, "StatefulSet", namespace, name))
    }

    async fn update_stateful_set(
        &self,
        namespace: &str,
        stateful_set: &StatefulSet,
    ) -> Result<()> {
        let name = stateful_set.name_any();
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&name, &PostParams::default(), stateful_set)
            .await
            .map_err(|e| Self::map_err(e, "StatefulSet", namespace, &name))?;
        Ok(())
    }
}
