//! Desired-state model for fleet rollouts
//!
//! Purely declarative: which services should run where, with what
//! replica counts and rollout strategy. The registry reads it only to
//! compute a progress ratio; step advancement, metric-gate evaluation,
//! and rollback belong to an external control loop.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(String);

impl DeploymentId {
    /// Create a deployment ID from an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random deployment ID.
    pub fn generate() -> Self {
        Self(format!("deploy-{}", uuid::Uuid::new_v4()))
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declarative target state for the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    /// Deployment this target belongs to
    pub deployment_id: DeploymentId,

    /// Datacenter → services that should run there
    pub datacenters: HashMap<String, Vec<ServiceTarget>>,

    /// Rollout strategy for reaching the target
    pub strategy: RolloutStrategy,

    /// Upper bound on instances changed in parallel
    pub max_parallel: u32,
}

impl DesiredState {
    /// Create an empty target for a deployment.
    pub fn new(deployment_id: DeploymentId) -> Self {
        Self {
            deployment_id,
            datacenters: HashMap::new(),
            strategy: RolloutStrategy::default(),
            max_parallel: 1,
        }
    }

    /// Total desired replica count across all datacenters and services.
    pub fn total_desired(&self) -> u32 {
        self.datacenters
            .values()
            .flatten()
            .map(|target| target.desired)
            .sum()
    }
}

/// Desired configuration for one service in one datacenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTarget {
    /// Service name
    pub service: String,

    /// Project the service belongs to
    pub project: String,

    /// Version to roll out
    pub version: semver::Version,

    /// Desired number of replicas
    pub desired: u32,

    /// Minimum replicas that must stay ready during a rollout
    pub min_ready: u32,

    /// Maximum extra replicas allowed during a rollout
    pub max_surge: u32,

    /// Canary parameters, when the canary strategy applies
    pub canary: Option<CanaryConfig>,
}

impl ServiceTarget {
    /// Logical domain name for the service: `"project/service"`.
    pub fn domain(&self) -> String {
        format!("{}/{}", self.project, self.service)
    }
}

/// Canary parameters read by the external rollout loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanaryConfig {
    /// Initial percentage of replicas exposed to the new version
    pub percent: u32,

    /// Percentage increment per evaluation step
    pub step: u32,

    /// Maximum error rate tolerated before rollback (0.0 to 1.0)
    pub max_error_rate: f64,

    /// Minimum success rate required to advance (0.0 to 1.0)
    pub min_success_rate: f64,
}

impl Default for CanaryConfig {
    fn default() -> Self {
        Self {
            percent: 10,
            step: 20,
            max_error_rate: 0.05,
            min_success_rate: 0.95,
        }
    }
}

/// Rollout strategy for a desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutStrategy {
    /// Gradual replacement of old replicas
    #[default]
    Rolling,
    /// Partial exposure with evaluation before full rollout
    Canary,
    /// Full parallel deployment then switch
    BlueGreen,
}

/// Status tag of a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutState {
    /// Waiting to be processed
    #[default]
    Pending,
    /// Rollout in progress
    InProgress,
    /// Rollout completed
    Completed,
    /// Rollout failed
    Failed,
}

/// User-facing rollout status, populated externally from
/// `Registry::progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutStatus {
    /// Deployment this status describes
    pub deployment_id: DeploymentId,

    /// Current rollout state
    pub status: RolloutState,

    /// Last error observed, if any
    pub last_error: Option<String>,

    /// Fraction of desired replicas running (0.0 to 1.0)
    pub progress: f64,

    /// Agent host → readiness
    pub agent_ready: HashMap<String, bool>,
}

impl RolloutStatus {
    /// Create a pending status for a deployment.
    pub fn new(deployment_id: DeploymentId) -> Self {
        Self {
            deployment_id,
            status: RolloutState::default(),
            last_error: None,
            progress: 0.0,
            agent_ready: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(service: &str, desired: u32) -> ServiceTarget {
        ServiceTarget {
            service: service.to_string(),
            project: "billing".to_string(),
            version: semver::Version::new(1, 2, 0),
            desired,
            min_ready: 1,
            max_surge: 1,
            canary: None,
        }
    }

    #[test]
    fn total_desired_sums_across_datacenters() {
        let mut state = DesiredState::new(DeploymentId::generate());
        state
            .datacenters
            .insert("dc-a".to_string(), vec![target("api", 3), target("worker", 2)]);
        state
            .datacenters
            .insert("dc-b".to_string(), vec![target("api", 5)]);

        assert_eq!(state.total_desired(), 10);
    }

    #[test]
    fn domain_combines_project_and_service() {
        assert_eq!(target("api", 1).domain(), "billing/api");
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&RolloutStrategy::BlueGreen).unwrap();
        assert_eq!(json, "\"blue_green\"");
    }

    #[test]
    fn canary_defaults_are_conservative() {
        let canary = CanaryConfig::default();
        assert!(canary.percent < 50);
        assert!(canary.max_error_rate <= 0.05);
    }
}
