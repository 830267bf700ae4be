//! Travel pass state machine
//!
//! A pass is Active or Inactive; each variant applies its own consumption
//! rule on top of that shared lifecycle:
//!
//! - Unlimited: every trip is consumed, whatever the status
//! - TimeBounded: trips are free until the expiration instant; the first
//!   attempt after it deactivates the pass
//! - CountBounded: each trip decrements a finite counter that never goes
//!   below zero

use chrono::NaiveDateTime;
use farepass_api::{ConsumeResult, PassInfo, PassKindTag, PassSpec, PassStatus, PassTerms, RemainingTrips};
use farepass_store::{PassRecord, PassRecordKind};
use farepass_util::{Clock, PassError, PassId, Result, parse_expiration_date};
use tracing::debug;

/// Variant-specific state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassKind {
    Unlimited,
    TimeBounded { expires_at: NaiveDateTime },
    CountBounded { remaining_trips: u32 },
}

impl PassKind {
    pub fn tag(&self) -> PassKindTag {
        match self {
            PassKind::Unlimited => PassKindTag::Unlimited,
            PassKind::TimeBounded { .. } => PassKindTag::TimeBounded,
            PassKind::CountBounded { .. } => PassKindTag::CountBounded,
        }
    }
}

/// A single fare entitlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelPass {
    id: PassId,
    owner: String,
    status: PassStatus,
    kind: PassKind,
}

impl TravelPass {
    fn new(id: PassId, owner: impl Into<String>, kind: PassKind) -> Result<Self> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(PassError::EmptyOwner);
        }

        Ok(Self {
            id,
            owner,
            status: PassStatus::Active,
            kind,
        })
    }

    pub fn unlimited(id: PassId, owner: impl Into<String>) -> Result<Self> {
        Self::new(id, owner, PassKind::Unlimited)
    }

    /// Time-bounded pass expiring at the start of `expires_on` (`YYYY-MM-DD`)
    pub fn time_bounded(id: PassId, owner: impl Into<String>, expires_on: &str) -> Result<Self> {
        let expires_at = parse_expiration_date(expires_on)?;
        Self::time_bounded_until(id, owner, expires_at)
    }

    pub fn time_bounded_until(
        id: PassId,
        owner: impl Into<String>,
        expires_at: NaiveDateTime,
    ) -> Result<Self> {
        Self::new(id, owner, PassKind::TimeBounded { expires_at })
    }

    pub fn count_bounded(id: PassId, owner: impl Into<String>, max_trips: i64) -> Result<Self> {
        let remaining_trips =
            u32::try_from(max_trips).map_err(|_| PassError::InvalidMaxTrips(max_trips))?;
        Self::new(id, owner, PassKind::CountBounded { remaining_trips })
    }

    /// Build a pass from an issue request
    pub fn from_spec(id: PassId, spec: &PassSpec) -> Result<Self> {
        match &spec.terms {
            PassTerms::Unlimited => Self::unlimited(id, spec.owner.as_str()),
            PassTerms::TimeBounded { expires_on } => {
                Self::time_bounded(id, spec.owner.as_str(), expires_on)
            }
            PassTerms::CountBounded { max_trips } => {
                Self::count_bounded(id, spec.owner.as_str(), *max_trips)
            }
        }
    }

    /// Rebuild a pass from its persisted snapshot
    ///
    /// Status and remaining trips are taken as stored, so an expired or
    /// deactivated pass stays inactive.
    pub fn from_record(record: PassRecord) -> Result<Self> {
        let kind = match record.kind {
            PassRecordKind::Unlimited => PassKind::Unlimited,
            PassRecordKind::TimeBounded { expires_at } => PassKind::TimeBounded { expires_at },
            PassRecordKind::CountBounded { remaining_trips } => {
                PassKind::CountBounded { remaining_trips }
            }
        };
        let mut pass = Self::new(record.pass_id, record.owner, kind)?;
        pass.status = record.status;
        Ok(pass)
    }

    pub fn to_record(&self) -> PassRecord {
        let kind = match self.kind {
            PassKind::Unlimited => PassRecordKind::Unlimited,
            PassKind::TimeBounded { expires_at } => PassRecordKind::TimeBounded { expires_at },
            PassKind::CountBounded { remaining_trips } => {
                PassRecordKind::CountBounded { remaining_trips }
            }
        };
        PassRecord::new(self.id, self.owner.clone(), self.status, kind)
    }

    pub fn id(&self) -> PassId {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn status(&self) -> PassStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn kind(&self) -> &PassKind {
        &self.kind
    }

    pub fn kind_tag(&self) -> PassKindTag {
        self.kind.tag()
    }

    pub fn remaining_trips(&self) -> RemainingTrips {
        match self.kind {
            PassKind::CountBounded { remaining_trips } => RemainingTrips::Limited(remaining_trips),
            PassKind::Unlimited | PassKind::TimeBounded { .. } => RemainingTrips::Unbounded,
        }
    }

    /// Expiration instant, for time-bounded passes only
    pub fn expires_at(&self) -> Option<NaiveDateTime> {
        match self.kind {
            PassKind::TimeBounded { expires_at } => Some(expires_at),
            _ => None,
        }
    }

    pub fn info(&self) -> PassInfo {
        PassInfo {
            pass_id: self.id,
            owner: self.owner.clone(),
            kind_tag: self.kind_tag(),
            status: self.status,
            remaining_trips: self.remaining_trips(),
            expires_at: self.expires_at(),
        }
    }

    pub fn activate(&mut self) {
        self.status = PassStatus::Active;
    }

    pub fn deactivate(&mut self) {
        self.status = PassStatus::Inactive;
    }

    /// Attempt to use one trip, reading the current instant from `clock`
    pub fn consume_trip(&mut self, clock: &dyn Clock) -> ConsumeResult {
        let now = clock.now();
        self.consume_trip_at(now)
    }

    /// Attempt to use one trip at the given instant
    pub fn consume_trip_at(&mut self, now: NaiveDateTime) -> ConsumeResult {
        match &mut self.kind {
            // Status is not consulted for unlimited passes.
            PassKind::Unlimited => {
                if self.status == PassStatus::Inactive {
                    debug!(pass_id = %self.id, "Inactive unlimited pass consumed");
                }
                ConsumeResult::Consumed(RemainingTrips::Unbounded)
            }
            PassKind::TimeBounded { expires_at } => {
                if self.status == PassStatus::Inactive {
                    ConsumeResult::DeniedInactive
                } else if now > *expires_at {
                    self.status = PassStatus::Inactive;
                    ConsumeResult::DeniedExpired
                } else {
                    ConsumeResult::Consumed(RemainingTrips::Unbounded)
                }
            }
            PassKind::CountBounded { remaining_trips } => {
                if self.status == PassStatus::Inactive {
                    ConsumeResult::DeniedInactive
                } else if *remaining_trips == 0 {
                    ConsumeResult::DeniedExhausted
                } else {
                    *remaining_trips -= 1;
                    ConsumeResult::Consumed(RemainingTrips::Limited(*remaining_trips))
                }
            }
        }
    }
}
