//! Resource application command

use analyzer_lib::{quantity, ResourceMutator, ResourceRequest};
use anyhow::{bail, Result};

use crate::commands::Context;
use crate::output::print_success;

/// Parse an optional CPU quantity argument like "200m" or "1.5"
pub fn parse_cpu_arg(raw: Option<&str>) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(0.0);
    };
    match quantity::parse_cpu_millicores(raw) {
        Some(v) => Ok(v),
        None => bail!("invalid CPU quantity: {raw}"),
    }
}

/// Parse an optional memory or storage quantity argument like "256Mi"
pub fn parse_memory_arg(raw: Option<&str>) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(0.0);
    };
    match quantity::parse_memory_bytes(raw) {
        Some(v) => Ok(v),
        None => bail!("invalid memory quantity: {raw}"),
    }
}

/// Apply new resource sizing to the controller owning a pod
pub async fn apply_resources(
    ctx: &Context,
    namespace: &str,
    pod: &str,
    cpu: Option<&str>,
    memory: Option<&str>,
    storage: Option<&str>,
) -> Result<()> {
    let request = ResourceRequest {
        pod_name: pod.to_string(),
        namespace: namespace.to_string(),
        cpu: parse_cpu_arg(cpu)?,
        memory: parse_memory_arg(memory)?,
        storage: parse_memory_arg(storage)?,
    };

    if request.cpu == 0.0 && request.memory == 0.0 && request.storage == 0.0 {
        bail!("nothing to apply: pass at least one of --cpu, --memory, --storage");
    }

    let mutator = ResourceMutator::new(ctx.orchestrator.clone());
    mutator.apply(&request).await?;

    print_success(&format!(
        "Updated the controller owning {namespace}/{pod}; changes roll out with the next pod replacement"
    ));
    Ok(())
}
