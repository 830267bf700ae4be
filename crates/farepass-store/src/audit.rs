//! Audit event types

use chrono::NaiveDateTime;
use farepass_api::{DenialReason, PassKindTag, RemainingTrips};
use farepass_util::PassId;
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Passes were issued from a config catalog
    CatalogLoaded { pass_count: usize },

    /// Pass issued
    PassIssued {
        pass_id: PassId,
        owner: String,
        kind: PassKindTag,
    },

    /// Trip consumed
    TripConsumed {
        pass_id: PassId,
        remaining: RemainingTrips,
    },

    /// Trip refused
    TripDenied {
        pass_id: PassId,
        reason: DenialReason,
    },

    /// Time-bounded pass observed past its expiration and deactivated itself
    PassExpired {
        pass_id: PassId,
        expired_at: NaiveDateTime,
    },

    /// Pass activated (`changed` is false when it was already active)
    PassActivated { pass_id: PassId, changed: bool },

    /// Pass deactivated (`changed` is false when it was already inactive)
    PassDeactivated { pass_id: PassId, changed: bool },
}

impl AuditEventType {
    /// The pass this event is about, if any
    pub fn pass_id(&self) -> Option<PassId> {
        match self {
            AuditEventType::CatalogLoaded { .. } => None,
            AuditEventType::PassIssued { pass_id, .. }
            | AuditEventType::TripConsumed { pass_id, .. }
            | AuditEventType::TripDenied { pass_id, .. }
            | AuditEventType::PassExpired { pass_id, .. }
            | AuditEventType::PassActivated { pass_id, .. }
            | AuditEventType::PassDeactivated { pass_id, .. } => Some(*pass_id),
        }
    }
}

/// Full audit event with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp, taken from the registry clock
    pub timestamp: NaiveDateTime,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(timestamp: NaiveDateTime, event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp,
            event,
        }
    }
}
