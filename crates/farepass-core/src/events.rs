//! Core events emitted by the registry

use chrono::NaiveDateTime;
use farepass_api::{DenialReason, PassStatus, RemainingTrips};
use farepass_util::PassId;

/// Events emitted by the pass registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassEvent {
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

    /// Time-bounded pass deactivated itself on an attempt past expiry
    Expired {
        pass_id: PassId,
        expired_at: NaiveDateTime,
    },

    /// Status set by activate/deactivate
    StatusChanged {
        pass_id: PassId,
        status: PassStatus,
        /// False when the pass already had this status
        changed: bool,
    },
}

impl PassEvent {
    pub fn pass_id(&self) -> PassId {
        match self {
            PassEvent::TripConsumed { pass_id, .. }
            | PassEvent::TripDenied { pass_id, .. }
            | PassEvent::Expired { pass_id, .. }
            | PassEvent::StatusChanged { pass_id, .. } => *pass_id,
        }
    }
}
