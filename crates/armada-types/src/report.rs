//! Agent report payload
//!
//! An agent periodically submits its *complete current* replica list.
//! This is the one replica shape shared between the ingestion boundary
//! and the registry's reconciliation entry point; the two must never
//! drift apart structurally.

use crate::replica::Replica;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full-state report from one agent.
///
/// The replica lists are keyed by datacenter: reconciliation treats
/// each (agent, datacenter) pair as its own scope, so one datacenter's
/// list never evicts replicas the agent legitimately runs elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    /// Reporting agent host
    pub host: String,

    /// Environment the agent runs in
    pub environment: String,

    /// Datacenter → complete list of replicas currently supervised there
    pub replicas: HashMap<String, Vec<Replica>>,

    /// When the agent assembled the report
    pub reported_at: DateTime<Utc>,
}

impl AgentReport {
    /// Create an empty report for a host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            environment: String::new(),
            replicas: HashMap::new(),
            reported_at: Utc::now(),
        }
    }

    /// Add a replica under its own datacenter.
    pub fn push(&mut self, replica: Replica) {
        self.replicas
            .entry(replica.datacenter.clone())
            .or_default()
            .push(replica);
    }

    /// Total replicas across all datacenters in the report.
    pub fn len(&self) -> usize {
        self.replicas.values().map(Vec::len).sum()
    }

    /// Whether the report carries no replicas.
    pub fn is_empty(&self) -> bool {
        self.replicas.values().all(Vec::is_empty)
    }
}
