//! The versioned fleet snapshot and its integrity checksum

use armada_types::{FleetMap, NodeId, Replica};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SnapshotError};

/// An integrity-checked, versioned copy of the fleet map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Monotonic version, incremented only by [`commit`](FleetSnapshot::commit)
    pub version: u64,

    /// Content checksum over the canonicalized fleet map
    pub checksum: String,

    /// When the metadata was last committed
    pub timestamp: DateTime<Utc>,

    /// When the snapshot last moved through gossip
    pub last_gossip_update: DateTime<Utc>,

    /// Node that produced this snapshot
    pub source_instance: NodeId,

    /// The embedded fleet map
    pub fleet: FleetMap,
}

impl FleetSnapshot {
    /// Wrap a fleet map copy into an uncommitted snapshot.
    ///
    /// The snapshot is not valid until the first
    /// [`commit`](FleetSnapshot::commit); never publish it before then.
    pub fn new(fleet: FleetMap, source_instance: NodeId) -> Self {
        let now = Utc::now();
        Self {
            version: 0,
            checksum: String::new(),
            timestamp: now,
            last_gossip_update: now,
            source_instance,
            fleet,
        }
    }

    /// Compute the checksum of the embedded fleet map.
    ///
    /// The fleet map is canonicalized first: datacenters sorted by
    /// name, agents by host, replica keys lexicographically. Two
    /// logically identical snapshots therefore always produce the same
    /// checksum, regardless of map iteration or agent insertion order.
    ///
    /// Agent heartbeats are excluded: they move on every report without
    /// any change in fleet content, and hashing them would make every
    /// pair of snapshots compare as different.
    pub fn compute_checksum(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();

        let mut dc_names: Vec<&String> = self.fleet.keys().collect();
        dc_names.sort();

        for name in dc_names {
            let dc = &self.fleet[name];
            hasher.update(name.as_bytes());
            hasher.update(dc.generation.to_le_bytes());

            let mut agents: Vec<_> = dc.agents.iter().collect();
            agents.sort_by(|a, b| a.host.cmp(&b.host));

            for agent in agents {
                hasher.update(agent.host.as_bytes());
                hasher.update([agent.healthy as u8]);

                let mut keys: Vec<&String> = agent.dependencies.keys().collect();
                keys.sort();
                for key in keys {
                    hasher.update(key.as_bytes());
                    hash_replica(&mut hasher, &agent.dependencies[key]);
                }
            }
        }

        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
    }

    /// Whether the stored checksum matches a freshly computed one.
    ///
    /// Consumers of a remote snapshot must check this before merging
    /// or trusting its contents, never after.
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Access the fleet map after verifying integrity.
    ///
    /// A corrupt snapshot is rejected, never merged and never fatal.
    pub fn verified_fleet(&self) -> Result<&FleetMap> {
        let computed = self.compute_checksum();
        if self.checksum != computed {
            warn!(
                version = self.version,
                source = %self.source_instance,
                "Rejecting snapshot with checksum mismatch"
            );
            return Err(SnapshotError::ChecksumMismatch {
                stored: self.checksum.clone(),
                computed,
            });
        }
        Ok(&self.fleet)
    }

    /// Commit the snapshot metadata for one logical state transition.
    ///
    /// Increments the version, refreshes both timestamps, recomputes
    /// the checksum, and records the producing node. Call exactly once
    /// per transition: skipping it desynchronizes the version from the
    /// content, and calling it twice breaks the total order peers
    /// expect when comparing versions.
    pub fn commit(&mut self, source_instance: &NodeId) {
        self.version += 1;
        self.timestamp = Utc::now();
        self.last_gossip_update = self.timestamp;
        self.source_instance = source_instance.clone();
        self.checksum = self.compute_checksum();

        debug!(
            version = self.version,
            source = %self.source_instance,
            "Committed snapshot metadata"
        );
    }
}

/// Hash every content field of a replica, in declaration order.
fn hash_replica(hasher: &mut sha2::Sha256, replica: &Replica) {
    use sha2::Digest;

    hasher.update(replica.service_uid.as_bytes());
    hasher.update(replica.process_id.to_le_bytes());
    hasher.update(replica.name.as_bytes());
    hasher.update(replica.agent_host.as_bytes());
    hasher.update(replica.project.as_bytes());
    hasher.update(replica.service.as_bytes());
    hasher.update(replica.version.as_bytes());
    hasher.update(replica.started_at.timestamp_millis().to_le_bytes());
    hasher.update([replica.healthy as u8, replica.tls as u8]);
    hasher.update(replica.status.as_bytes());
    for port in &replica.ports {
        hasher.update(port.to_le_bytes());
    }
    hasher.update(replica.environment.as_bytes());
    hasher.update(replica.datacenter.as_bytes());
    hasher.update(replica.mask.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_types::{Agent, Datacenter};
    use chrono::TimeZone;

    fn replica(uid: &str, pid: u32, host: &str) -> Replica {
        let mut replica = Replica::new(uid, pid, "dc-a");
        replica.agent_host = host.to_string();
        replica.started_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        replica
    }

    fn agent(host: &str, replicas: Vec<Replica>) -> Agent {
        let mut agent = Agent::new(host);
        for r in replicas {
            agent.dependencies.insert(r.key(), r);
        }
        agent
    }

    fn fleet(agents: Vec<Agent>) -> FleetMap {
        let mut dc = Datacenter::new();
        dc.agents = agents;
        let mut fleet = FleetMap::new();
        fleet.insert("dc-a".to_string(), dc);
        fleet
    }

    #[test]
    fn valid_after_commit() {
        let source = NodeId::generate();
        let mut snapshot = FleetSnapshot::new(
            fleet(vec![agent("agent1", vec![replica("svc1", 100, "agent1")])]),
            source.clone(),
        );
        assert!(!snapshot.is_valid());

        snapshot.commit(&source);
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.is_valid());
        assert!(snapshot.verified_fleet().is_ok());
    }

    #[test]
    fn invalid_after_uncommitted_mutation() {
        let source = NodeId::generate();
        let mut snapshot = FleetSnapshot::new(
            fleet(vec![agent("agent1", vec![replica("svc1", 100, "agent1")])]),
            source.clone(),
        );
        snapshot.commit(&source);

        let extra = replica("svc2", 200, "agent1");
        snapshot.fleet.get_mut("dc-a").unwrap().agents[0]
            .dependencies
            .insert(extra.key(), extra);

        assert!(!snapshot.is_valid());
        assert!(matches!(
            snapshot.verified_fleet(),
            Err(SnapshotError::ChecksumMismatch { .. })
        ));

        // A fresh commit restores validity and advances the version.
        snapshot.commit(&source);
        assert_eq!(snapshot.version, 2);
        assert!(snapshot.is_valid());
    }

    #[test]
    fn checksum_ignores_agent_ordering() {
        let a1 = agent("agent1", vec![replica("svc1", 100, "agent1")]);
        let a2 = agent("agent2", vec![replica("svc2", 200, "agent2")]);

        let source = NodeId::generate();
        let forward = FleetSnapshot::new(fleet(vec![a1.clone(), a2.clone()]), source.clone());
        let reversed = FleetSnapshot::new(fleet(vec![a2, a1]), source);

        assert_eq!(forward.compute_checksum(), reversed.compute_checksum());
    }

    #[test]
    fn checksum_ignores_heartbeats() {
        let source = NodeId::generate();
        let mut snapshot = FleetSnapshot::new(
            fleet(vec![agent("agent1", vec![replica("svc1", 100, "agent1")])]),
            source.clone(),
        );
        snapshot.commit(&source);

        snapshot.fleet.get_mut("dc-a").unwrap().agents[0].last_heartbeat = Utc::now();
        assert!(snapshot.is_valid());
    }

    #[test]
    fn checksum_tracks_replica_content() {
        let source = NodeId::generate();
        let mut snapshot = FleetSnapshot::new(
            fleet(vec![agent("agent1", vec![replica("svc1", 100, "agent1")])]),
            source.clone(),
        );
        snapshot.commit(&source);

        snapshot
            .fleet
            .get_mut("dc-a")
            .unwrap()
            .agents[0]
            .dependencies
            .get_mut("svc1:100")
            .unwrap()
            .status = "stopped".to_string();

        assert!(!snapshot.is_valid());
    }

    #[test]
    fn survives_interchange_roundtrip() {
        let source = NodeId::generate();
        let mut snapshot = FleetSnapshot::new(
            fleet(vec![agent("agent1", vec![replica("svc1", 100, "agent1")])]),
            source.clone(),
        );
        snapshot.commit(&source);

        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: FleetSnapshot = serde_json::from_str(&encoded).unwrap();

        assert!(decoded.is_valid());
        assert_eq!(decoded, snapshot);
    }
}
