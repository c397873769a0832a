//! Client settings persistence.
//!
//! Stores client settings in the platform-specific config directory:
//! - Linux: ~/.config/keydesk/settings.json
//! - macOS: ~/Library/Application Support/keydesk/settings.json
//! - Windows: %APPDATA%/keydesk/settings.json
//!
//! Environment variables override the file.

use std::path::{Path, PathBuf};

use keydesk_domain::ClientSettings;
use tokio::fs;

use super::keydesk_config_dir;
use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Overrides [`ClientSettings::api_base_url`].
pub const ENV_API_URL: &str = "KEYDESK_API_URL";

/// Overrides [`ClientSettings::request_timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "KEYDESK_TIMEOUT_SECS";

const SETTINGS_FILE: &str = "settings.json";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// An environment override has an unusable value.
    #[error("invalid value for {name}: {value:?}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for client settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Creates a repository in the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: keydesk_config_dir().map(|dir| dir.join(SETTINGS_FILE)),
        }
    }

    /// Creates a repository backed by `dir/settings.json`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(SETTINGS_FILE)),
        }
    }

    /// Returns the path where settings are stored, if available.
    #[must_use]
    pub fn settings_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings from disk.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(ClientSettings::default());
        };

        if !fs::try_exists(path).await? {
            return Ok(ClientSettings::default());
        }

        let content = fs::read(path).await?;
        let settings = from_json_bytes(&content)?;
        Ok(settings)
    }

    /// Loads settings and applies the process environment on top.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or an override is malformed.
    pub async fn load_with_env(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load().await?;
        apply_env_overrides(settings, |name| std::env::var(name).ok())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory is known or the write fails.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = to_json_stable_bytes(settings)?;
        fs::write(path, content).await?;

        Ok(())
    }
}

/// Applies `KEYDESK_*` overrides read through `lookup`.
///
/// Blank values are ignored.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidOverride`] if the timeout is not a
/// positive integer.
pub fn apply_env_overrides(
    mut settings: ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(url) = read(ENV_API_URL) {
        settings.api_base_url = url.trim().to_string();
    }
    if let Some(value) = read(ENV_TIMEOUT_SECS) {
        settings.request_timeout_secs = value
            .trim()
            .parse()
            .ok()
            .filter(|secs: &u64| *secs > 0)
            .ok_or(SettingsError::InvalidOverride {
                name: ENV_TIMEOUT_SECS,
                value,
            })?;
    }
    Ok(settings)
}
