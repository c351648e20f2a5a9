//! Error types for the manager

use thiserror::Error;

/// Manager-level errors
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Coordinator connection error (non-transient)
    #[error("Coordinator error: {0}")]
    Coordinator(String),

    /// Registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Worker registration failure in stream mode (fatal)
    #[error("Registration of worker {ip} failed: {source}")]
    Registration {
        ip: String,
        #[source]
        source: RegistryError,
    },

    /// Kubernetes API error
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] kube::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registry-specific errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Query against the membership table failed
    #[error("Query error: {0}")]
    Query(String),

    /// Node registration statement failed
    #[error("Mutation error: {0}")]
    Mutation(String),
}

/// Result type alias for manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
