//! The error surface the storage ports speak. `marker-core` classifies
//! these into its own `MarkerError` taxonomy (see `spec.md` §7); the port
//! layer only needs to distinguish "not found" from "everything else",
//! mirroring how `ferrex-core`'s repositories bubble up a flat
//! `MediaError::Internal(String)` for most `sqlx::Error` cases.
use std::fmt;

#[derive(Debug)]
pub enum PortError {
    /// The requested row does not exist.
    NotFound(String),
    /// Any other storage failure; fatal to the in-flight mutation.
    Backend(String),
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::NotFound(msg) => write!(f, "not found: {msg}"),
            PortError::Backend(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for PortError {}

pub type Result<T> = std::result::Result<T, PortError>;
