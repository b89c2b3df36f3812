//! Armada Types - Core types for the fleet control-plane state model
//!
//! Armada tracks which service replicas are running, on which hosts, in
//! which datacenter, and reconciles that live state against periodic
//! full-state agent reports.
//!
//! ## Architectural Boundaries
//!
//! - **armada-registry** owns: the live fleet map and its reconciliation
//! - **armada-snapshot** owns: versioned, integrity-checked exports
//! - This crate owns: the value records shared by both, plus the
//!   desired-state model consumed by progress reporting
//!
//! ## Key Concepts
//!
//! - **Replica**: one running instance of a service, keyed by
//!   service uid + process id
//! - **Agent**: a host-level reporter owning its set of replicas
//! - **Datacenter**: a named partition of the fleet; top-level key of
//!   the fleet map
//! - **AgentReport**: the full-state payload an agent submits; the one
//!   replica shape shared between ingestion and reconciliation
//! - **DesiredState**: declarative rollout target, read only by
//!   progress reporting

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod agent;
pub mod desired;
pub mod replica;
pub mod report;

// Re-export main types
pub use agent::{Agent, Datacenter, FleetMap};
pub use desired::{
    CanaryConfig, DeploymentId, DesiredState, RolloutState, RolloutStatus, RolloutStrategy,
    ServiceTarget,
};
pub use replica::{Replica, STATUS_RUNNING};
pub use report::AgentReport;

/// Identifier of a control-plane node producing snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node ID from an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random node ID.
    pub fn generate() -> Self {
        Self(format!("node-{}", uuid::Uuid::new_v4()))
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
