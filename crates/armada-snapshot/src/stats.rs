//! Statistics export for dashboards and peers

use crate::snapshot::FleetSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-datacenter aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatacenterStats {
    /// Agents reporting in this datacenter
    pub agents: usize,

    /// Distinct services running in this datacenter
    pub services: usize,

    /// Replicas running in this datacenter
    pub replicas: usize,
}

/// Aggregate view of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Snapshot version the stats were taken from
    pub version: u64,

    /// When the snapshot metadata was last committed
    pub last_update: DateTime<Utc>,

    /// Datacenter name → aggregates
    pub datacenters: HashMap<String, DatacenterStats>,

    /// Total replicas across the fleet
    pub total_replicas: usize,

    /// Distinct agent hosts across all datacenters
    pub distinct_agents: usize,
}

impl FleetSnapshot {
    /// Aggregate counts over the embedded fleet map.
    ///
    /// Agent hosts are deduplicated across datacenters: a host
    /// reporting into two datacenters counts once.
    pub fn stats(&self) -> SnapshotStats {
        let mut datacenters = HashMap::new();
        let mut total_replicas = 0;
        let mut hosts: HashSet<&str> = HashSet::new();

        for (name, dc) in &self.fleet {
            let mut services: HashSet<&str> = HashSet::new();
            let mut replicas = 0;

            for agent in &dc.agents {
                hosts.insert(agent.host.as_str());
                replicas += agent.dependencies.len();
                for replica in agent.dependencies.values() {
                    services.insert(replica.service_uid.as_str());
                }
            }

            total_replicas += replicas;
            datacenters.insert(
                name.clone(),
                DatacenterStats {
                    agents: dc.agents.len(),
                    services: services.len(),
                    replicas,
                },
            );
        }

        SnapshotStats {
            version: self.version,
            last_update: self.timestamp,
            datacenters,
            total_replicas,
            distinct_agents: hosts.len(),
        }
    }
}
