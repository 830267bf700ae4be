//! Shared types for farepass
//!
//! This crate defines the vocabulary shared between the core, the store,
//! the config layer and the CLI:
//! - Pass status and remaining-trip counts
//! - Consumption outcomes
//! - Issue requests (`PassSpec`)
//! - Read-only pass views

mod types;

pub use types::*;

/// Current version of the persisted pass record layout
pub const RECORD_VERSION: u32 = 1;
