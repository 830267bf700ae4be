//! Error types for farepass

use thiserror::Error;

use crate::PassId;

/// Core error type for farepass operations
///
/// Trip denials are not errors; they are reported as `ConsumeResult` values.
/// This type covers construction failures and lookups.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("Pass not found: {0}")]
    PassNotFound(PassId),

    #[error("Owner name cannot be empty")]
    EmptyOwner,

    #[error("Invalid max_trips {0}: must be between 0 and {max}", max = u32::MAX)]
    InvalidMaxTrips(i64),

    #[error("Invalid expiration date '{value}': {message}")]
    InvalidExpiration { value: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PassError {
    pub fn expiration(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpiration {
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            PassError::PassNotFound(PassId::from_raw(7)).to_string(),
            "Pass not found: P-000007"
        );
        assert_eq!(
            PassError::InvalidMaxTrips(-1).to_string(),
            "Invalid max_trips -1: must be between 0 and 4294967295"
        );
        assert_eq!(
            PassError::expiration("2024-13-01", "input is out of range").to_string(),
            "Invalid expiration date '2024-13-01': input is out of range"
        );
    }
}
