//! Error types for etcd-join

use thiserror::Error;

/// Result type for etcd-join operations
pub type Result<T> = std::result::Result<T, JoinError>;

/// etcd-join error types
#[derive(Error, Debug)]
pub enum JoinError {
    #[error("Unable to find in-service members of the fleet")]
    EmptyFleet,

    #[error("Node {0} is not a member of the fleet")]
    NotInFleet(String),

    #[error("Fleet error: {0}")]
    Fleet(String),

    #[error("Error {operation} ({status}): {body}")]
    MembershipMutation {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Cluster unreachable: {0}")]
    ClusterUnreachable(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl JoinError {
    /// Build a mutation error from a failed membership call
    pub fn mutation(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        JoinError::MembershipMutation {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }
}
