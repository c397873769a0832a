//! File-backed client-local storage.

mod client_state;
mod settings_repository;

use std::path::PathBuf;

pub use client_state::FileClientStateStore;
pub use settings_repository::{
    ENV_API_URL, ENV_TIMEOUT_SECS, SettingsError, SettingsRepository, apply_env_overrides,
};

/// Returns the Keydesk config directory, if the platform has one.
fn keydesk_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("keydesk"))
}
