//! Pod and cluster analysis commands

use analyzer_lib::{ClusterAggregator, PodMetrics, PodMetricsCollector};
use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::commands::Context;
use crate::output::{color_score, format_bytes, format_cpu, format_currency, print_warning, OutputFormat};

/// Row for the per-pod analysis table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "CPU Lim")]
    current_cpu: String,
    #[tabled(rename = "CPU Rec")]
    recommend_cpu: String,
    #[tabled(rename = "Mem Lim")]
    current_memory: String,
    #[tabled(rename = "Mem Rec")]
    recommend_memory: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl PodRow {
    fn from_metrics(m: &PodMetrics) -> Self {
        Self {
            namespace: m.namespace.clone(),
            pod: m.pod_name.clone(),
            current_cpu: format_cpu(m.current_cpu),
            recommend_cpu: format_cpu(m.recommend_cpu),
            current_memory: format_bytes(m.current_memory),
            recommend_memory: format_bytes(m.recommend_memory),
            score: color_score(m.optimization_score),
        }
    }
}

/// Analyze a single pod
pub async fn analyze_pod(
    ctx: &Context,
    namespace: &str,
    pod: &str,
    format: OutputFormat,
) -> Result<()> {
    let collector = PodMetricsCollector::new(ctx.orchestrator.clone(), ctx.metrics.clone());
    let metrics = collector.analyze(namespace, pod).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        OutputFormat::Table => {
            let table = tabled::Table::new([PodRow::from_metrics(&metrics)])
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "Observed peaks: {} CPU, {} memory",
                format_cpu(metrics.max_cpu),
                format_bytes(metrics.max_memory)
            );
        }
    }

    Ok(())
}

/// Analyze every pod in the cluster
pub async fn analyze_cluster(ctx: &Context, format: OutputFormat) -> Result<()> {
    let aggregator = ClusterAggregator::new(
        ctx.orchestrator.clone(),
        ctx.metrics.clone(),
        ctx.config.clone(),
    );
    let stats = aggregator.cluster_stats().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Table => {
            if stats.pods.is_empty() {
                print_warning("No pods analyzed");
                return Ok(());
            }

            let rows: Vec<PodRow> = stats.pods.iter().map(PodRow::from_metrics).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            println!();
            println!("{}", "Cluster Totals".bold());
            println!("{}", "-".repeat(50));
            println!("Pods analyzed:          {}", stats.total_pods);
            println!(
                "Declared:               {} CPU, {} memory",
                format_cpu(stats.total_current_cpu),
                format_bytes(stats.total_current_memory)
            );
            println!(
                "Recommended:            {} CPU, {} memory",
                format_cpu(stats.total_recommend_cpu),
                format_bytes(stats.total_recommend_memory)
            );
            println!(
                "{} {}",
                "Potential Savings:".bold(),
                format_currency(stats.potential_savings).green().bold()
            );
        }
    }

    Ok(())
}
