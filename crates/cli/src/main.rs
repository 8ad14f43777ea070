//! Pod Resource Rightsizer CLI
//!
//! A command-line tool for analyzing pod resource sizing against observed
//! usage, applying recommended limits, and finding idle workloads.

mod commands;
mod output;

use analyzer_lib::AnalyzerConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pod Resource Rightsizer CLI
#[derive(Parser)]
#[command(name = "rightsizer")]
#[command(author, version, about = "CLI for Pod Resource Rightsizer", long_about = None)]
pub struct Cli {
    /// Prometheus endpoint (can also be set via RIGHTSIZER_PROMETHEUS_URL)
    #[arg(long, env = "RIGHTSIZER_PROMETHEUS_URL")]
    pub prometheus_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze resource sizing against observed usage
    #[command(subcommand)]
    Analyze(AnalyzeCommands),

    /// Apply resource sizing to the controller owning a pod
    Apply {
        /// Pod name
        #[arg(long)]
        pod: String,

        /// Namespace of the pod
        #[arg(long, short, default_value = "default")]
        namespace: String,

        /// CPU limit and request, e.g. "200m" or "1.5"
        #[arg(long)]
        cpu: Option<String>,

        /// Memory limit and request, e.g. "256Mi"
        #[arg(long)]
        memory: Option<String>,

        /// Ephemeral storage limit and request, e.g. "1Gi"
        #[arg(long)]
        storage: Option<String>,
    },

    /// Find containers with no recent inbound network traffic
    DeadContainers {
        /// Namespace to scan (defaults to the configured idle namespace)
        #[arg(long, short)]
        namespace: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AnalyzeCommands {
    /// Analyze a single pod
    Pod {
        /// Pod name
        pod: String,

        /// Namespace of the pod
        #[arg(long, short, default_value = "default")]
        namespace: String,
    },

    /// Analyze every pod in the cluster
    Cluster,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AnalyzerConfig::load()?;
    if let Some(url) = &cli.prometheus_url {
        config.prometheus_url = url.clone();
    }

    let ctx = commands::Context::connect(config).await?;

    match cli.command {
        Commands::Analyze(analyze_cmd) => match analyze_cmd {
            AnalyzeCommands::Pod { pod, namespace } => {
                commands::analyze::analyze_pod(&ctx, &namespace, &pod, cli.format).await?;
            }
            AnalyzeCommands::Cluster => {
                commands::analyze::analyze_cluster(&ctx, cli.format).await?;
            }
        },
        Commands::Apply {
            pod,
            namespace,
            cpu,
            memory,
            storage,
        } => {
            commands::apply::apply_resources(
                &ctx,
                &namespace,
                &pod,
                cpu.as_deref(),
                memory.as_deref(),
                storage.as_deref(),
            )
            .await?;
        }
        Commands::DeadContainers { namespace } => {
            commands::idle::dead_containers(&ctx, namespace.as_deref(), cli.format).await?;
        }
    }

    Ok(())
}
