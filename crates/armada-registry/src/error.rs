//! Registry error types

use thiserror::Error;

/// Registry errors
///
/// All variants are local and recoverable; the registry never aborts
/// the process and never retries (retry policy belongs to the
/// transport delivering reports).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Datacenter not found: {0}")]
    DatacenterNotFound(String),

    #[error("Agent not found: {host} in datacenter {datacenter}")]
    AgentNotFound { datacenter: String, host: String },

    #[error("Replica not found: {key} on agent {host}")]
    ReplicaNotFound { host: String, key: String },
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
