//! Read-side queries over a snapshot
//!
//! Lookup is by logical path (`project/name`). Endpoint resolution
//! filters to healthy replicas and applies an optional result-count
//! limit by simple truncation; callers wanting load-balanced ordering
//! shuffle the result themselves.

use crate::snapshot::FleetSnapshot;
use armada_types::Replica;
use serde::{Deserialize, Serialize};

/// A resolvable endpoint for one healthy replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host the replica runs on
    pub host: String,

    /// First listening port, if the replica reported any
    pub port: Option<u16>,

    /// Whether the replica serves TLS
    pub tls: bool,
}

impl Endpoint {
    /// `host:port` form, or the bare host when no port was reported.
    pub fn address(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

impl FleetSnapshot {
    /// Look up a replica by logical path, regardless of health.
    ///
    /// Candidates are ordered by (agent host, replica key), so the
    /// result is deterministic when several replicas share a path.
    pub fn find_replica(&self, path: &str) -> Option<&Replica> {
        self.replicas_at(path)
            .min_by(|a, b| (&a.agent_host, a.key()).cmp(&(&b.agent_host, b.key())))
    }

    /// Whether at least one healthy replica serves the path.
    pub fn is_available(&self, path: &str) -> bool {
        self.replicas_at(path).any(|r| r.healthy)
    }

    /// Resolve healthy endpoints for a path.
    ///
    /// Results are sorted by (agent host, replica key) and truncated to
    /// `limit` when given; a limited result set is deterministic, not
    /// load-balanced.
    pub fn resolve_endpoints(&self, path: &str, limit: Option<usize>) -> Vec<Endpoint> {
        let mut candidates: Vec<&Replica> = self.replicas_at(path).filter(|r| r.healthy).collect();
        candidates.sort_by(|a, b| (&a.agent_host, a.key()).cmp(&(&b.agent_host, b.key())));

        if let Some(limit) = limit {
            candidates.truncate(limit);
        }

        candidates
            .into_iter()
            .map(|r| Endpoint {
                host: r.agent_host.clone(),
                port: r.ports.first().copied(),
                tls: r.tls,
            })
            .collect()
    }

    fn replicas_at<'a, 'b>(&'a self, path: &'b str) -> impl Iterator<Item = &'a Replica> + use<'a, 'b> {
        self.fleet
            .values()
            .flat_map(|dc| dc.agents.iter())
            .flat_map(|agent| agent.dependencies.values())
            .filter(move |r| r.path() == path)
    }
}
