//! Core fare-entitlement engine for farepass
//!
//! This crate is the heart of farepass, containing:
//! - The travel pass state machine (Active/Inactive lifecycle, three
//!   consumption policies)
//! - The pass registry, which owns passes, assigns ids, and records every
//!   decision to the audit log
//! - Events describing what each operation did

mod events;
mod pass;
mod registry;

pub use events::*;
pub use pass::*;
pub use registry::*;
