//! Resource mutation through the owning controller
//!
//! Changing a live pod's resources would be undone on the next pod
//! replacement, so mutations always target the controller that owns the
//! pod: the Deployment behind a ReplicaSet-owned pod, or the StatefulSet
//! directly. The change lands in the controller's pod template and takes
//! effect asynchronously as the controller rolls pods; rollout is not
//! awaited or verified here.
//!
//! Updates go through the backend's replace semantics, so a concurrent
//! writer surfaces as a version conflict. There is no built-in retry;
//! callers re-read and re-apply.

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use tracing::info;

use crate::error::{AnalyzerError, Result};
use crate::models::ResourceRequest;
use crate::orchestrator::OrchestrationClient;
use crate::quantity::{format_bytes_quantity, format_millicores};

/// The controller object a mutation resolves to
#[derive(Debug, Clone)]
pub enum OwningController {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
}

/// Applies approved resource changes to a pod's owning controller
pub struct ResourceMutator {
    orchestrator: Arc<dyn OrchestrationClient>,
}

impl ResourceMutator {
    pub fn new(orchestrator: Arc<dyn OrchestrationClient>) -> Self {
        Self { orchestrator }
    }

    /// Walk a pod's owner references to its controller.
    ///
    /// A ReplicaSet owner is followed one more hop to its Deployment; a
    /// StatefulSet owner is used directly. Any other or absent immediate
    /// owner is unsupported; a ReplicaSet with no Deployment behind it
    /// reports the missing Deployment.
    pub async fn resolve_controller(
        &self,
        namespace: &str,
        pod_name: &str,
    ) -> Result<OwningController> {
        let pod = self.orchestrator.get_pod(namespace, pod_name).await?;

        let owner = pod
            .metadata
            .owner_references
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|r| r.kind == "ReplicaSet" || r.kind == "StatefulSet")
            .cloned()
            .ok_or_else(|| AnalyzerError::UnsupportedOwner {
                namespace: namespace.to_string(),
                name: pod_name.to_string(),
            })?;

        if owner.kind == "StatefulSet" {
            let stateful_set = self
                .orchestrator
                .get_stateful_set(namespace, &owner.name)
                .await?;
            return Ok(OwningController::StatefulSet(stateful_set));
        }

        let replica_set = self
            .orchestrator
            .get_replica_set(namespace, &owner.name)
            .await?;
        let deployment_ref = replica_set
            .metadata
            .owner_references
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .find(|r| r.kind == "Deployment")
            .cloned()
            .ok_or_else(|| AnalyzerError::not_found("Deployment", namespace, &owner.name))?;

        let deployment = self
            .orchestrator
            .get_deployment(namespace, &deployment_ref.name)
            .await?;
        Ok(OwningController::Deployment(deployment))
    }

    /// Apply the non-zero fields of a request to every container of the
    /// resolved controller's pod template, then persist the controller.
    ///
    /// Limit and request are set symmetrically. Zero fields, other resource
    /// keys, and everything else on the controller are preserved verbatim.
    pub async fn apply(&self, request: &ResourceRequest) -> Result<()> {
        if request.pod_name.is_empty() || request.namespace.is_empty() {
            return Err(AnalyzerError::Validation(
                "pod_name and namespace are required".to_string(),
            ));
        }

        match self
            .resolve_controller(&request.namespace, &request.pod_name)
            .await?
        {
            OwningController::Deployment(mut deployment) => {
                if let Some(pod_spec) = deployment
                    .spec
                    .as_mut()
                    .and_then(|s| s.template.spec.as_mut())
                {
                    for container in &mut pod_spec.containers {
                        apply_to_container(container, request);
                    }
                }
                info!(
                    namespace = %request.namespace,
                    pod = %request.pod_name,
                    deployment = deployment.metadata.name.as_deref().unwrap_or_default(),
                    "updating deployment resources"
                );
                self.orchestrator
                    .update_deployment(&request.namespace, &deployment)
                    .await
            }
            OwningController::StatefulSet(mut stateful_set) => {
                if let Some(pod_spec) = stateful_set
                    .spec
                    .as_mut()
                    .and_then(|s| s.template.spec.as_mut())
                {
                    for container in &mut pod_spec.containers {
                        apply_to_container(container, request);
                    }
                }
                info!(
                    namespace = %request.namespace,
                    pod = %request.pod_name,
                    stateful_set = stateful_set.metadata.name.as_deref().unwrap_or_default(),
                    "updating stateful set resources"
                );
                self.orchestrator
                    .update_stateful_set(&request.namespace, &stateful_set)
                    .await
            }
        }
    }
}

/// Set limit and request symmetrically for every non-zero request field.
/// Zero means "leave unchanged", never "set to zero".
fn apply_to_container(container: &mut Container, request: &ResourceRequest) {
    let resources = container.resources.get_or_insert_with(Default::default);

    if request.cpu > 0.0 {
        set_symmetric(resources, "cpu", Quantity(format_millicores(request.cpu)));
    }
    if request.memory > 0.0 {
        set_symmetric(
            resources,
            "memory",
            Quantity(format_bytes_quantity(request.memory)),
        );
    }
    if request.storage > 0.0 {
        set_symmetric(
            resources,
            "ephemeral-storage",
            Quantity(format_bytes_quantity(request.storage)),
        );
    }
}

fn set_symmetric(
    resources: &mut k8s_openapi::api::core::v1::ResourceRequirements,
    key: &str,
    value: Quantity,
) {
    resources
        .limits
        .get_or_insert_with(BTreeMap::new)
        .insert(key.to_string(), value.clone());
    resources
        .requests
        .get_or_insert_with(BTreeMap::new)
        .insert(key.to_string(), value);
}
