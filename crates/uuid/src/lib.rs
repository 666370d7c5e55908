//! Patient record identifiers.
//!
//! Every patient document is keyed by a *canonical* UUID: **32 lowercase hexadecimal characters**
//! with no hyphens, e.g. `550e8400e29b41d4a716446655440000`. This is the same value
//! `Uuid::new_v4().simple().to_string()` produces.
//!
//! The canonical form doubles as the on-disk location of the document. For an id `u` the store
//! keeps the record under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, which keeps any one directory
//! from collecting every record in the registry.
//!
//! Externally supplied ids (URL path segments, CLI arguments) must already be canonical; uppercase,
//! hyphenated or otherwise non-canonical input is rejected rather than normalised.

mod service;

pub use service::ShardableUuid;

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
