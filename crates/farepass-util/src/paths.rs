//! Default paths for farepass components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/farepass/config.toml` or `~/.config/farepass/config.toml`
//! - Data: `$XDG_DATA_HOME/farepass` or `~/.local/share/farepass`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const FAREPASS_CONFIG_ENV: &str = "FAREPASS_CONFIG";

/// Environment variable for overriding the data directory
pub const FAREPASS_DATA_DIR_ENV: &str = "FAREPASS_DATA_DIR";

/// Database filename within the data directory
pub const DATABASE_FILENAME: &str = "farepass.db";

/// Application subdirectory name
const APP_DIR: &str = "farepass";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$FAREPASS_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/farepass/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/farepass/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(FAREPASS_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking FAREPASS_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$FAREPASS_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/farepass` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/farepass` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(FAREPASS_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking FAREPASS_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_farepass() {
        let path = config_path_without_env();
        assert!(path.to_string_lossy().contains("farepass"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn data_dir_contains_farepass() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("farepass"));
    }
}
