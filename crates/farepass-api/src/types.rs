//! Shared types for the farepass API

use chrono::NaiveDateTime;
use farepass_util::PassId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pass kind tag for display and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKindTag {
    Unlimited,
    TimeBounded,
    CountBounded,
}

impl fmt::Display for PassKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PassKindTag::Unlimited => "unlimited",
            PassKindTag::TimeBounded => "time-bounded",
            PassKindTag::CountBounded => "count-bounded",
        };
        f.write_str(s)
    }
}

/// Lifecycle status gating consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    Active,
    Inactive,
}

impl PassStatus {
    pub fn is_active(self) -> bool {
        self == PassStatus::Active
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassStatus::Active => f.write_str("active"),
            PassStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// Trips left on a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "trips", rename_all = "snake_case")]
pub enum RemainingTrips {
    Unbounded,
    Limited(u32),
}

impl RemainingTrips {
    pub fn is_unbounded(self) -> bool {
        matches!(self, RemainingTrips::Unbounded)
    }

    /// Finite count, or None for unbounded passes
    pub fn limited(self) -> Option<u32> {
        match self {
            RemainingTrips::Unbounded => None,
            RemainingTrips::Limited(n) => Some(n),
        }
    }
}

impl fmt::Display for RemainingTrips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainingTrips::Unbounded => f.write_str("∞"),
            RemainingTrips::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Why a trip was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Inactive,
    Exhausted,
    Expired,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::Inactive => f.write_str("Pass is inactive"),
            DenialReason::Exhausted => f.write_str("No trips remaining"),
            DenialReason::Expired => f.write_str("Pass has expired"),
        }
    }
}

/// Outcome of a single consumption attempt
///
/// Denials are ordinary outcomes: a rider tapping a depleted card is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "remaining", rename_all = "snake_case")]
pub enum ConsumeResult {
    Consumed(RemainingTrips),
    DeniedInactive,
    DeniedExhausted,
    DeniedExpired,
}

impl ConsumeResult {
    pub fn is_consumed(&self) -> bool {
        matches!(self, ConsumeResult::Consumed(_))
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            ConsumeResult::Consumed(_) => None,
            ConsumeResult::DeniedInactive => Some(DenialReason::Inactive),
            ConsumeResult::DeniedExhausted => Some(DenialReason::Exhausted),
            ConsumeResult::DeniedExpired => Some(DenialReason::Expired),
        }
    }
}

impl fmt::Display for ConsumeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumeResult::Consumed(remaining) => {
                write!(f, "Trip consumed, {} remaining", remaining)
            }
            ConsumeResult::DeniedInactive => fmt::Display::fmt(&DenialReason::Inactive, f),
            ConsumeResult::DeniedExhausted => fmt::Display::fmt(&DenialReason::Exhausted, f),
            ConsumeResult::DeniedExpired => fmt::Display::fmt(&DenialReason::Expired, f),
        }
    }
}

/// Variant parameters for issuing a pass, as supplied by config or CLI
///
/// Values are unvalidated; the core rejects bad ones at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PassTerms {
    Unlimited,
    TimeBounded {
        /// Calendar date, `YYYY-MM-DD`; the pass is valid through the start of that day
        expires_on: String,
    },
    CountBounded {
        max_trips: i64,
    },
}

impl PassTerms {
    pub fn tag(&self) -> PassKindTag {
        match self {
            PassTerms::Unlimited => PassKindTag::Unlimited,
            PassTerms::TimeBounded { .. } => PassKindTag::TimeBounded,
            PassTerms::CountBounded { .. } => PassKindTag::CountBounded,
        }
    }
}

/// Request to issue one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSpec {
    pub owner: String,
    pub terms: PassTerms,
}

impl PassSpec {
    pub fn new(owner: impl Into<String>, terms: PassTerms) -> Self {
        Self {
            owner: owner.into(),
            terms,
        }
    }

    pub fn unlimited(owner: impl Into<String>) -> Self {
        Self::new(owner, PassTerms::Unlimited)
    }

    pub fn time_bounded(owner: impl Into<String>, expires_on: impl Into<String>) -> Self {
        Self::new(
            owner,
            PassTerms::TimeBounded {
                expires_on: expires_on.into(),
            },
        )
    }

    pub fn count_bounded(owner: impl Into<String>, max_trips: i64) -> Self {
        Self::new(owner, PassTerms::CountBounded { max_trips })
    }
}

/// Read-only view of a pass for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassInfo {
    pub pass_id: PassId,
    pub owner: String,
    pub kind_tag: PassKindTag,
    pub status: PassStatus,
    pub remaining_trips: RemainingTrips,
    /// Only set for time-bounded passes
    pub expires_at: Option<NaiveDateTime>,
}
