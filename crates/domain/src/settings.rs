//! Client settings.
//!
//! Defines how the client reaches the backend and where it writes files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client settings, stored as JSON in the user config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the REST backend.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Directory export files are written to. `None` means the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            export_dir: None,
        }
    }
}

impl ClientSettings {
    /// Returns the export directory, defaulting to the working directory.
    #[must_use]
    pub fn export_dir_or_current(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
