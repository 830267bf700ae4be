//! Shared utilities for farepass
//!
//! This crate provides:
//! - ID types (PassId) and the registry-owned ID generator
//! - Clock abstraction (system clock with mock-time support, manual clock for tests)
//! - Calendar date parsing for pass expiration
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
