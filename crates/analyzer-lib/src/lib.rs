//! Analyzer library for pod resource rightsizing
//!
//! This crate provides the core functionality for:
//! - Per-pod metrics collection from the orchestrator and Prometheus
//! - Recommendation scoring against observed peak usage
//! - Cluster-wide aggregation with cost-savings estimates
//! - Resource mutation through a pod's owning controller
//! - Idle workload detection from network activity

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod error;
pub mod idle;
pub mod metrics;
pub mod models;
pub mod mutator;
pub mod orchestrator;
pub mod quantity;
pub mod recommender;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::ClusterAggregator;
pub use collector::PodMetricsCollector;
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Result};
pub use idle::IdleWorkloadDetector;
pub use metrics::{MetricsProvider, PrometheusProvider, QueryValue};
pub use models::*;
pub use mutator::{OwningController, ResourceMutator};
pub use orchestrator::{KubeOrchestrator, OrchestrationClient};
