//! Validated catalog produced from a raw configuration

use crate::schema::{RawConfig, RawServiceConfig};
use farepass_api::PassSpec;
use farepass_util::data_dir_without_env;
use std::path::PathBuf;

/// Default number of audit events shown by `farepass audit`
pub const DEFAULT_AUDIT_LIMIT: usize = 20;

/// Validated configuration: service settings plus the passes to issue
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub service: ServiceConfig,
    pub passes: Vec<PassSpec>,
}

impl Catalog {
    /// Convert a raw config. Call only after `validate_config` returned no errors.
    pub fn from_raw(raw: RawConfig) -> Self {
        let service = ServiceConfig::from_raw(raw.service);
        let passes = raw
            .passes
            .into_iter()
            .map(|p| PassSpec::new(p.owner.trim(), p.terms))
            .collect();

        Self { service, passes }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub audit_limit: usize,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(data_dir_without_env),
            audit_limit: raw.audit_limit.unwrap_or(DEFAULT_AUDIT_LIMIT),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: data_dir_without_env(),
            audit_limit: DEFAULT_AUDIT_LIMIT,
        }
    }
}
