//! Configuration validation

use crate::schema::{RawConfig, RawPass};
use farepass_api::PassTerms;
use farepass_util::{PassError, parse_expiration_date};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Pass #{index}: owner cannot be empty")]
    EmptyOwner { index: usize },

    #[error("Pass #{index} ('{owner}'): max_trips {value} must be between 0 and {max}", max = u32::MAX)]
    InvalidMaxTrips {
        index: usize,
        owner: String,
        value: i64,
    },

    #[error("Pass #{index} ('{owner}'): invalid expiration date '{value}': {message}")]
    InvalidExpiration {
        index: usize,
        owner: String,
        value: String,
        message: String,
    },

    #[error("Service config error: {0}")]
    ServiceError(String),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.service.audit_limit == Some(0) {
        errors.push(ValidationError::ServiceError(
            "audit_limit must be at least 1".into(),
        ));
    }

    // Passes are numbered from 1 to match how people count entries in a file
    for (i, pass) in config.passes.iter().enumerate() {
        errors.extend(validate_pass(i + 1, pass));
    }

    errors
}

fn validate_pass(index: usize, pass: &RawPass) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let owner = pass.owner.trim();

    if owner.is_empty() {
        errors.push(ValidationError::EmptyOwner { index });
    }

    match &pass.terms {
        PassTerms::Unlimited => {}
        PassTerms::TimeBounded { expires_on } => {
            if let Err(e) = parse_expiration_date(expires_on) {
                let message = match e {
                    PassError::InvalidExpiration { message, .. } => message,
                    other => other.to_string(),
                };
                errors.push(ValidationError::InvalidExpiration {
                    index,
                    owner: owner.to_string(),
                    value: expires_on.clone(),
                    message,
                });
            }
        }
        PassTerms::CountBounded { max_trips } => {
            if u32::try_from(*max_trips).is_err() {
                errors.push(ValidationError::InvalidMaxTrips {
                    index,
                    owner: owner.to_string(),
                    value: *max_trips,
                });
            }
        }
    }

    errors
}
