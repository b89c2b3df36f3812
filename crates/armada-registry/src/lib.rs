//! Armada Registry - Concurrency-safe fleet registry and reconciliation
//!
//! The registry owns the live fleet map (datacenter → agents →
//! replicas) together with a global generation counter and last-update
//! timestamp, all guarded by one lock as a single consistency unit.
//!
//! Writes flow one way: agent report → [`Registry::update`] → fleet
//! map. Reads flow the other: fleet map → snapshot export, or fleet
//! map + desired state → progress ratio.
//!
//! ## Reconciliation
//!
//! [`Registry::update`] ingests an agent's *complete current* replica
//! list and garbage-collects whatever that agent no longer reports.
//! A single full-state report therefore recovers the registry from any
//! number of missed individual add/remove signals.
//!
//! ## Construction
//!
//! One registry per control-plane node, explicitly constructed and
//! passed to callers. Multiple independent registries coexist freely
//! (tests, multi-tenant deployments); there is no process-wide
//! singleton.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod registry;

// Re-exports
pub use error::{RegistryError, Result};
pub use registry::Registry;
