//! Raw configuration schema (as parsed from TOML)

use farepass_api::PassTerms;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-wide settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Passes to issue when the registry starts empty
    #[serde(default)]
    pub passes: Vec<RawPass>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the store
    pub data_dir: Option<PathBuf>,

    /// How many audit events `farepass audit` shows by default
    pub audit_limit: Option<usize>,
}

/// Raw pass definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPass {
    /// Pass holder
    pub owner: String,

    /// Variant and its parameters
    pub terms: PassTerms,
}
