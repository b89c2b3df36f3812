//! Snapshot error types

use thiserror::Error;

/// Snapshot errors
///
/// An integrity failure means the snapshot must be rejected, never
/// merged; it is not fatal to the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;
