//! Armada Snapshot - Versioned, integrity-checked fleet snapshots
//!
//! A [`FleetSnapshot`] is a point-in-time copy of the fleet map meant
//! for exchange between control-plane peers (gossip/anti-entropy) or
//! durable storage. It carries a monotonic version, a content checksum
//! over a canonicalized form of the fleet map, timestamps, and the id
//! of the producing node.
//!
//! ## Contract
//!
//! - [`FleetSnapshot::commit`] is the only operation that increments
//!   the version and recomputes the checksum; call it exactly once per
//!   logical state transition.
//! - A snapshot received from a peer must pass
//!   [`FleetSnapshot::is_valid`] before its contents are trusted or
//!   merged; [`FleetSnapshot::verified_fleet`] bundles the check.
//! - Once published a snapshot is immutable; publish by atomic swap so
//!   readers never observe one mid-construction.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod query;
pub mod snapshot;
pub mod stats;

// Re-exports
pub use error::{Result, SnapshotError};
pub use query::Endpoint;
pub use snapshot::FleetSnapshot;
pub use stats::{DatacenterStats, SnapshotStats};
