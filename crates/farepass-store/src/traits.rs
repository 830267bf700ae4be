//! Store trait definitions

use chrono::NaiveDateTime;
use farepass_api::{PassKindTag, PassStatus, RECORD_VERSION};
use farepass_util::PassId;
use serde::{Deserialize, Serialize};

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event, returning the id the store assigned to it
    fn append_audit(&self, event: AuditEvent) -> StoreResult<i64>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    /// Get audit events for one pass, newest first
    fn get_pass_audits(&self, pass_id: PassId, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Pass snapshots

    /// Insert or overwrite the snapshot of a pass
    fn save_pass(&self, record: &PassRecord) -> StoreResult<()>;

    /// Load the snapshot of a single pass
    fn load_pass(&self, pass_id: PassId) -> StoreResult<Option<PassRecord>>;

    /// Load every stored pass, ordered by id
    fn load_passes(&self) -> StoreResult<Vec<PassRecord>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Persisted form of a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassRecord {
    pub record_version: u32,
    pub pass_id: PassId,
    pub owner: String,
    pub status: PassStatus,
    pub kind: PassRecordKind,
}

impl PassRecord {
    pub fn new(pass_id: PassId, owner: String, status: PassStatus, kind: PassRecordKind) -> Self {
        Self {
            record_version: RECORD_VERSION,
            pass_id,
            owner,
            status,
            kind,
        }
    }
}

/// Variant state of a persisted pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PassRecordKind {
    Unlimited,
    TimeBounded { expires_at: NaiveDateTime },
    CountBounded { remaining_trips: u32 },
}

impl PassRecordKind {
    pub fn tag(&self) -> PassKindTag {
        match self {
            PassRecordKind::Unlimited => PassKindTag::Unlimited,
            PassRecordKind::TimeBounded { .. } => PassKindTag::TimeBounded,
            PassRecordKind::CountBounded { .. } => PassKindTag::CountBounded,
        }
    }
}
