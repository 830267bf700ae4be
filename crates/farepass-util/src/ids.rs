//! Strongly-typed identifiers for farepass

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PassError;

/// Unique identifier for an issued pass, assigned by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassId(u64);

impl PassId {
    pub const PREFIX: &'static str = "P-";

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:06}", Self::PREFIX, self.0)
    }
}

impl FromStr for PassId {
    type Err = PassError;

    /// Accepts both the display form (`P-000042`) and a bare number (`42`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| PassError::internal(format!("Invalid pass id: {}", s)))
    }
}

/// Sequential ID source owned by a pass registry
///
/// Ids start at 1 and are never handed out twice by the same generator.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Create a generator that continues after `last` (e.g. after restoring
    /// passes from a store)
    pub fn resume_after(last: Option<PassId>) -> Self {
        Self {
            next: last.map_or(1, |id| id.0.saturating_add(1)),
        }
    }

    pub fn next_id(&mut self) -> PassId {
        let id = PassId(self.next);
        self.next += 1;
        id
    }

    /// The id that the next call to `next_id` will return
    pub fn peek(&self) -> PassId {
        PassId(self.next)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_id_equality() {
        let id1 = PassId::from_raw(1);
        let id2 = PassId::from_raw(1);
        let id3 = PassId::from_raw(2);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert!(id1 < id3);
    }

    #[test]
    fn pass_id_display_and_parse() {
        let id = PassId::from_raw(42);
        assert_eq!(id.to_string(), "P-000042");
        assert_eq!("P-000042".parse::<PassId>().unwrap(), id);
        assert_eq!("42".parse::<PassId>().unwrap(), id);
        assert!("P-abc".parse::<PassId>().is_err());
        assert!("".parse::<PassId>().is_err());
    }

    #[test]
    fn generator_is_sequential() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), PassId::from_raw(1));
        assert_eq!(ids.next_id(), PassId::from_raw(2));
        assert_eq!(ids.peek(), PassId::from_raw(3));
    }

    #[test]
    fn generator_resumes_after_last() {
        let mut ids = IdGenerator::resume_after(Some(PassId::from_raw(9)));
        assert_eq!(ids.next_id(), PassId::from_raw(10));

        let mut fresh = IdGenerator::resume_after(None);
        assert_eq!(fresh.next_id(), PassId::from_raw(1));
    }

    #[test]
    fn ids_serialize_deserialize() {
        let id = PassId::from_raw(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "5");
        let parsed: PassId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
