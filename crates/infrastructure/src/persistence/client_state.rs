//! Client-local state file.
//!
//! Remembers the last active connection in the platform config directory:
//! - Linux: ~/.config/keydesk/state.json
//! - macOS: ~/Library/Application Support/keydesk/state.json
//! - Windows: %APPDATA%/keydesk/state.json

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use keydesk_application::ports::{ClientStateError, ClientStateStore};

use super::keydesk_config_dir;
use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const STATE_FILE: &str = "state.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_connection: Option<String>,
}

/// Stores client state as a JSON file.
#[derive(Debug, Clone)]
pub struct FileClientStateStore {
    path: Option<PathBuf>,
}

impl FileClientStateStore {
    /// Creates a store backed by `dir/state.json`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(STATE_FILE)),
        }
    }

    /// Creates a store in the platform config directory.
    ///
    /// If no config directory can be determined, nothing is remembered and
    /// writes fail with [`ClientStateError::NoLocation`].
    #[must_use]
    pub fn default_location() -> Self {
        Self {
            path: keydesk_config_dir().map(|dir| dir.join(STATE_FILE)),
        }
    }

    /// Returns the state file path, if available.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn read(&self) -> Result<StateFile, ClientStateError> {
        let Some(path) = &self.path else {
            return Ok(StateFile::default());
        };
        match fs::read(path).await {
            Ok(content) => from_json_bytes(&content)
                .map_err(|e| ClientStateError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StateFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, state: &StateFile) -> Result<(), ClientStateError> {
        let Some(path) = &self.path else {
            return Err(ClientStateError::NoLocation);
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = to_json_stable_bytes(state)
            .map_err(|e| ClientStateError::Serialization(e.to_string()))?;
        fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), "client state written");
        Ok(())
    }
}

#[async_trait]
impl ClientStateStore for FileClientStateStore {
    async fn remembered_connection(&self) -> Result<Option<String>, ClientStateError> {
        Ok(self.read().await?.last_connection)
    }

    async fn remember_connection(&self, name: &str) -> Result<(), ClientStateError> {
        let mut state = self.read().await.unwrap_or_default();
        state.last_connection = Some(name.to_string());
        self.write(&state).await
    }

    async fn forget_connection(&self) -> Result<(), ClientStateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(());
        }
        let mut state = self.read().await.unwrap_or_default();
        state.last_connection = None;
        self.write(&state).await
    }
}
