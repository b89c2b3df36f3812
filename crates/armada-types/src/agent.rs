//! Agent and datacenter types forming the fleet map
//!
//! The fleet map is the root registry structure: datacenter name →
//! datacenter bucket → agents → replicas. It is the single consistency
//! domain owned by one registry instance.

use crate::replica::Replica;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The root registry structure: datacenter name → datacenter bucket.
pub type FleetMap = HashMap<String, Datacenter>;

/// One host's set of reported replicas plus heartbeat state.
///
/// The dependency map is exclusively owned by this agent; an agent
/// whose dependencies empty out is pruned from its datacenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent host, unique within its datacenter
    pub host: String,

    /// Replica key → replica, exclusively owned by this agent
    pub dependencies: HashMap<String, Replica>,

    /// Last heartbeat timestamp
    pub last_heartbeat: DateTime<Utc>,

    /// Whether the agent itself is considered healthy
    pub healthy: bool,
}

impl Agent {
    /// Create an empty agent for a host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            dependencies: HashMap::new(),
            last_heartbeat: Utc::now(),
            healthy: true,
        }
    }

    /// Refresh heartbeat and health after receiving a report.
    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    /// Refresh heartbeat to a report's own timestamp.
    ///
    /// Reconciliation uses the time the agent assembled its report, not
    /// the time the registry processed it, so replaying an identical
    /// report leaves the agent record identical.
    pub fn touch_at(&mut self, at: DateTime<Utc>) {
        self.last_heartbeat = at;
        self.healthy = true;
    }

    /// Whether the agent owns no replicas.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// The set of agents within one datacenter plus a local counter.
///
/// The local generation advances whenever the bucket is touched by a
/// reconciling update; a datacenter with no agents is pruned from the
/// fleet map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Datacenter {
    /// Agents in this datacenter (unordered)
    pub agents: Vec<Agent>,

    /// Local generation counter
    pub generation: u64,
}

impl Datacenter {
    /// Create an empty datacenter bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find an agent by host.
    pub fn agent(&self, host: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.host == host)
    }

    /// Find an agent by host, mutably.
    pub fn agent_mut(&mut self, host: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.host == host)
    }

    /// Find or create the agent for a host.
    pub fn agent_entry(&mut self, host: &str) -> &mut Agent {
        let idx = match self.agents.iter().position(|a| a.host == host) {
            Some(idx) => idx,
            None => {
                self.agents.push(Agent::new(host));
                self.agents.len() - 1
            }
        };
        &mut self.agents[idx]
    }

    /// Remove an agent by host.
    pub fn remove_agent(&mut self, host: &str) {
        self.agents.retain(|a| a.host != host);
    }

    /// Whether the bucket holds no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
