//! The fleet registry
//!
//! One lock guards the fleet map, the global generation counter, and
//! the last-update timestamp as a single consistency unit. Every
//! operation is synchronous, performs no I/O, and blocks on nothing
//! but the lock.

use armada_types::{AgentReport, DesiredState, FleetMap, Replica};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{RegistryError, Result};

/// Everything the registry lock protects.
struct RegistryState {
    fleet: FleetMap,
    generation: u64,
    last_update: DateTime<Utc>,
}

/// Concurrency-safe registry over the live fleet map.
///
/// ## Generation contract
///
/// Every successful mutation advances the global generation by exactly
/// one: [`upsert`](Registry::upsert), a successful
/// [`remove`](Registry::remove), [`update`](Registry::update) (once
/// per call, even when the report changes nothing), and
/// [`clean`](Registry::clean). Consumers may poll
/// [`generation`](Registry::generation) as a cheap "has anything
/// changed" signal.
///
/// ## Ordering
///
/// Concurrent callers are serialized by the lock in acquisition order;
/// the registry gives no further ordering guarantee. Reports for one
/// agent must be delivered single-writer upstream if their relative
/// order matters.
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Create an empty registry.
    ///
    /// One per control-plane node; constructed explicitly and passed to
    /// callers rather than held as a process-wide singleton.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                fleet: FleetMap::new(),
                generation: 0,
                last_update: Utc::now(),
            }),
        }
    }

    /// Insert or refresh one replica under its datacenter and agent.
    ///
    /// A missing datacenter entry is created additively; existing
    /// sibling datacenters are never touched.
    pub fn upsert(&self, replica: Replica, agent_host: &str) {
        let mut state = self.state.write();

        let key = replica.key();
        let dc_name = replica.datacenter.clone();
        let dc = state.fleet.entry(dc_name.clone()).or_default();
        let agent = dc.agent_entry(agent_host);
        agent.touch();
        agent.dependencies.insert(key.clone(), replica);
        dc.generation += 1;

        state.generation += 1;
        state.last_update = Utc::now();

        debug!(key = %key, datacenter = %dc_name, agent = agent_host, "Upserted replica");
    }

    /// Remove one replica, pruning its agent and datacenter if they
    /// empty out.
    ///
    /// Fails with a not-found error if the datacenter, agent, or
    /// replica key is absent, leaving the fleet map unchanged.
    pub fn remove(&self, replica: &Replica, agent_host: &str) -> Result<()> {
        let mut state = self.state.write();

        let key = replica.key();
        let dc_name = replica.datacenter.as_str();

        let dc = state
            .fleet
            .get_mut(dc_name)
            .ok_or_else(|| RegistryError::DatacenterNotFound(dc_name.to_string()))?;
        let agent = dc
            .agent_mut(agent_host)
            .ok_or_else(|| RegistryError::AgentNotFound {
                datacenter: dc_name.to_string(),
                host: agent_host.to_string(),
            })?;
        if agent.dependencies.remove(&key).is_none() {
            return Err(RegistryError::ReplicaNotFound {
                host: agent_host.to_string(),
                key,
            });
        }

        if agent.is_empty() {
            dc.remove_agent(agent_host);
        }
        dc.generation += 1;
        if dc.is_empty() {
            state.fleet.remove(dc_name);
        }

        state.generation += 1;
        state.last_update = Utc::now();

        debug!(key = %key, datacenter = %dc_name, agent = agent_host, "Removed replica");
        Ok(())
    }

    /// Reconcile one agent's complete current state.
    ///
    /// For every datacenter in the report: the datacenter entry is
    /// ensured additively, the agent is found or created, its heartbeat
    /// is refreshed to the report's own timestamp, and every reported
    /// replica is upserted under its key. A garbage-collection pass
    /// then deletes any dependency of that agent not in the reported
    /// key set, pruning empty agents and datacenters.
    ///
    /// The reconciliation scope is per (agent, datacenter): a report
    /// covering only one datacenter never evicts replicas the same
    /// agent legitimately runs in another. A datacenter the report
    /// names with an empty list is reconciled to empty.
    ///
    /// The global generation advances exactly once per call, whether or
    /// not anything logically changed.
    pub fn update(&self, report: &AgentReport) {
        let mut state = self.state.write();
        let host = report.host.as_str();

        for (dc_name, replicas) in &report.replicas {
            // An empty list from an agent with no record in this bucket
            // is a no-op; creating the agent just to prune it again
            // would churn the bucket counter on every replay.
            if replicas.is_empty() {
                let absent = state
                    .fleet
                    .get(dc_name)
                    .map_or(true, |dc| dc.agent(host).is_none());
                if absent {
                    continue;
                }
            }

            let dc_empty = {
                let dc = state.fleet.entry(dc_name.clone()).or_default();
                let agent = dc.agent_entry(host);

                // The bucket counter only moves when this reconcile
                // actually changes the agent's record, so replaying an
                // identical report leaves the fleet map byte-identical.
                let changed = agent.last_heartbeat != report.reported_at
                    || !agent.healthy
                    || agent.dependencies.len() != replicas.len()
                    || replicas
                        .iter()
                        .any(|r| agent.dependencies.get(&r.key()) != Some(r));

                agent.touch_at(report.reported_at);
                let reported: HashSet<String> = replicas.iter().map(Replica::key).collect();
                for replica in replicas {
                    agent.dependencies.insert(replica.key(), replica.clone());
                }
                // GC scoped to this (agent, datacenter) pair
                agent.dependencies.retain(|key, _| reported.contains(key));

                if agent.is_empty() {
                    dc.remove_agent(host);
                }
                if changed {
                    dc.generation += 1;
                }
                dc.is_empty()
            };
            if dc_empty {
                state.fleet.remove(dc_name);
            }
        }

        state.generation += 1;
        state.last_update = Utc::now();

        debug!(
            host,
            datacenters = report.replicas.len(),
            replicas = report.len(),
            generation = state.generation,
            "Reconciled agent report"
        );
    }

    /// Reset the fleet map to empty.
    ///
    /// Used for full resets: leadership change, test teardown.
    pub fn clean(&self) {
        let mut state = self.state.write();
        state.fleet.clear();
        state.generation += 1;
        state.last_update = Utc::now();

        info!("Registry cleaned");
    }

    /// Deep copy of the current fleet map.
    ///
    /// Never hands out the live, lock-protected structure; callers may
    /// iterate and mutate the copy freely.
    pub fn get(&self) -> FleetMap {
        self.state.read().fleet.clone()
    }

    /// Coarse rollout progress: running replicas / total desired.
    ///
    /// Returns exactly 1.0 when the desired total is zero. This is a
    /// global ratio: it can read 100% while one service is entirely
    /// missing, as long as totals balance elsewhere. Callers needing
    /// per-service granularity must cross-reference
    /// [`get`](Registry::get) against the desired state themselves.
    pub fn progress(&self, desired: &DesiredState) -> f64 {
        let total = desired.total_desired();
        if total == 0 {
            return 1.0;
        }

        let state = self.state.read();
        let running = state
            .fleet
            .values()
            .flat_map(|dc| dc.agents.iter())
            .flat_map(|agent| agent.dependencies.values())
            .filter(|replica| replica.is_running())
            .count();

        running as f64 / total as f64
    }

    /// Current global generation.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// When the registry last mutated.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.state.read().last_update
    }

    /// Total replicas currently tracked across all datacenters.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .fleet
            .values()
            .flat_map(|dc| dc.agents.iter())
            .map(|agent| agent.dependencies.len())
            .sum()
    }

    /// Whether the registry tracks no replicas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Local generation counter of one datacenter, if present.
    pub fn datacenter_generation(&self, datacenter: &str) -> Option<u64> {
        self.state
            .read()
            .fleet
            .get(datacenter)
            .map(|dc| dc.generation)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
