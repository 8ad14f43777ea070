//! Idle workload detection command

use analyzer_lib::IdleWorkloadDetector;
use anyhow::Result;
use tabled::Tabled;

use crate::commands::Context;
use crate::output::{format_bytes, print_success, OutputFormat};

/// Row for the dead containers table
#[derive(Tabled)]
struct DeadContainerRow {
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Net In")]
    network_in: String,
    #[tabled(rename = "Last Activity")]
    last_activity: String,
}

/// Report containers with no recent inbound network traffic
pub async fn dead_containers(
    ctx: &Context,
    namespace: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let namespace = namespace.unwrap_or(&ctx.config.idle_namespace);
    let detector = IdleWorkloadDetector::new(
        ctx.orchestrator.clone(),
        ctx.metrics.clone(),
        namespace,
    );
    let dead = detector.find_dead_containers().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&dead)?);
        }
        OutputFormat::Table => {
            if dead.is_empty() {
                print_success(&format!("No idle containers found in {namespace}"));
                return Ok(());
            }

            let rows: Vec<DeadContainerRow> = dead
                .iter()
                .map(|d| DeadContainerRow {
                    pod: d.pod_name.clone(),
                    container: d.container_name.clone(),
                    kind: d.pod_type.clone(),
                    network_in: format_bytes(d.network_in_bytes),
                    last_activity: d
                        .last_activity
                        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nTotal: {} idle containers", dead.len());
        }
    }

    Ok(())
}
