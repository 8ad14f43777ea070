//! Error taxonomy for the analysis and mutation engine

use thiserror::Error;

/// Errors surfaced by the analyzer
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A pod, namespace, or owning controller does not exist
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// The metrics backend call failed or returned malformed data
    #[error("metrics query failed: {0}")]
    Query(String),

    /// The mutation target's controller kind is not recognized
    #[error("pod {namespace}/{name} is not owned by a Deployment or StatefulSet")]
    UnsupportedOwner { namespace: String, name: String },

    /// A concurrent update was rejected by the backend's version check
    #[error("conflicting update on {kind} {namespace}/{name}, retry with a fresh read")]
    Conflict {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    /// A request is missing required identifiers
    #[error("invalid request: {0}")]
    Validation(String),

    /// Orchestration backend transport failure
    #[error("kubernetes api error: {0}")]
    Kube(#[from] kube::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Construct a NotFound for the given object
    pub fn not_found(kind: &'static str, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}
