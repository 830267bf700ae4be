//! Persistence layer for farepass
//!
//! Passes live in memory; durable storage is an explicit collaborator.
//! This crate provides:
//! - Audit log (append-only)
//! - Pass snapshots (one row per pass, overwritten on change)

mod audit;
mod sqlite;
mod traits;

pub use audit::*;
pub use sqlite::*;
pub use traits::*;

use farepass_util::PassId;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pass id {0} is outside the storable range")]
    PassIdOutOfRange(PassId),

    #[error("Unsupported record version {found} (expected {expected})")]
    UnsupportedRecordVersion { found: u32, expected: u32 },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
