//! Configuration file handling for ~/.tilegen/config.ini.
//!
//! Settings structs live in [`super::settings`], constants in
//! [`super::defaults`] and parsing in [`super::parser`]. Credentials may also
//! come from the environment, which wins over the file.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{ENV_MAPBOX_API_KEY, ENV_ROBLOX_API_KEY, ENV_ROBLOX_USER_ID};
use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.tilegen/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path, then apply environment
    /// overrides.
    ///
    /// If the file doesn't exist, the defaults are used.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load only the file, ignoring the environment.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Replace credentials with values from `lookup` (an environment
    /// reader). Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_ROBLOX_API_KEY) {
            self.roblox.api_key = Some(v);
        }
        if let Some(v) = get(ENV_ROBLOX_USER_ID) {
            self.roblox.user_id = Some(v);
        }
        if let Some(v) = get(ENV_MAPBOX_API_KEY) {
            self.mapbox.access_token = Some(v);
        }
    }
}

/// Get the path to the config directory (~/.tilegen).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tilegen")
}

/// Get the path to the config file (~/.tilegen/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
