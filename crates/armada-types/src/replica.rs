//! Replica types for individual running service instances
//!
//! A Replica is one running instance of a service as reported by the
//! agent supervising it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Status tag agents report for a replica that is serving.
pub const STATUS_RUNNING: &str = "running";

/// A running service replica.
///
/// Identity is `(service_uid, process_id)`: a process restart produces
/// a new process id and therefore a new [`key`](Replica::key). Stale
/// keys for the same logical service are reconciled away by the
/// registry, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replica {
    /// Stable identifier of the service this replica belongs to
    pub service_uid: String,

    /// OS process id on the agent host
    pub process_id: u32,

    /// Instance name (used for endpoint lookup, see [`path`](Replica::path))
    pub name: String,

    /// Host of the agent supervising this replica
    pub agent_host: String,

    /// Project the service belongs to
    pub project: String,

    /// Service name
    pub service: String,

    /// Version the replica is running (free-form, as reported)
    pub version: String,

    /// When the process started; uptime is derived from this at read time
    pub started_at: DateTime<Utc>,

    /// Whether the agent considers the replica healthy
    pub healthy: bool,

    /// Free-form state tag, e.g. "running"
    pub status: String,

    /// Ports the replica listens on
    pub ports: Vec<u16>,

    /// Whether the replica serves TLS
    pub tls: bool,

    /// Environment the replica runs in (e.g. "production")
    pub environment: String,

    /// Datacenter the replica runs in
    pub datacenter: String,

    /// Routing mask
    pub mask: String,
}

impl Replica {
    /// Create a replica with its identity triple; remaining fields take
    /// empty defaults and are filled in by the reporting agent.
    pub fn new(
        service_uid: impl Into<String>,
        process_id: u32,
        datacenter: impl Into<String>,
    ) -> Self {
        Self {
            service_uid: service_uid.into(),
            process_id,
            name: String::new(),
            agent_host: String::new(),
            project: String::new(),
            service: String::new(),
            version: String::new(),
            started_at: Utc::now(),
            healthy: true,
            status: STATUS_RUNNING.to_string(),
            ports: Vec::new(),
            tls: false,
            environment: String::new(),
            datacenter: datacenter.into(),
            mask: String::new(),
        }
    }

    /// Registry key for this replica: `"uid:pid"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.service_uid, self.process_id)
    }

    /// Logical endpoint path: `"project/name"`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.project, self.name)
    }

    /// Uptime derived from the stored start timestamp.
    pub fn uptime(&self) -> Duration {
        Utc::now() - self.started_at
    }

    /// Whether the status tag denotes a serving replica.
    pub fn is_running(&self) -> bool {
        self.status == STATUS_RUNNING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_combines_uid_and_pid() {
        let replica = Replica::new("svc1", 100, "dc-a");
        assert_eq!(replica.key(), "svc1:100");
    }

    #[test]
    fn restart_changes_key() {
        let before = Replica::new("svc1", 100, "dc-a");
        let after = Replica::new("svc1", 101, "dc-a");
        assert_ne!(before.key(), after.key());
    }

    #[test]
    fn path_combines_project_and_name() {
        let mut replica = Replica::new("svc1", 100, "dc-a");
        replica.project = "billing".to_string();
        replica.name = "invoicer".to_string();
        assert_eq!(replica.path(), "billing/invoicer");
    }

    #[test]
    fn uptime_grows_from_start_timestamp() {
        let mut replica = Replica::new("svc1", 100, "dc-a");
        replica.started_at = Utc::now() - Duration::seconds(90);
        assert!(replica.uptime() >= Duration::seconds(90));
    }

    #[test]
    fn running_status_detected() {
        let mut replica = Replica::new("svc1", 100, "dc-a");
        assert!(replica.is_running());
        replica.status = "stopped".to_string();
        assert!(!replica.is_running());
    }
}
