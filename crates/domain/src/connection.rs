//! Connection profiles and key handles.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, require_non_blank};

/// Default port of a key-value store.
pub const DEFAULT_PORT: u16 = 6379;

/// A named set of coordinates identifying one backend store instance.
///
/// The name is the stable identifier. Profiles are compared by exact name:
/// no case folding and no trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Unique profile name.
    pub name: String,
    /// Store host.
    pub host: String,
    /// Store port.
    pub port: u16,
    /// Store password. The backend never returns it once saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Logical database index inside the store.
    #[serde(default)]
    pub db: u32,
}

impl ConnectionProfile {
    /// Creates a profile with no password on database 0.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            password: None,
            db: 0,
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the database index.
    #[must_use]
    pub const fn with_db(mut self, db: u32) -> Self {
        self.db = db;
        self
    }

    /// Checks that the profile can be saved.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyName`] if the name is blank.
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank(&self.name, DomainError::EmptyName)
    }

    /// Returns a `host:port/db` label for display.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self::new("", "localhost", DEFAULT_PORT)
    }
}

/// A lightweight handle to a record, as returned by a key listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEntry {
    /// The record key.
    pub key: String,
}

impl KeyEntry {
    /// Creates a key entry.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl From<String> for KeyEntry {
    fn from(key: String) -> Self {
        Self { key }
    }
}

/// Picks the profile to activate when a session starts.
///
/// The remembered name wins when it is still present. Otherwise the
/// lexicographically smallest name is chosen. An empty set selects nothing.
#[must_use]
pub fn startup_selection<'a>(
    profiles: &'a [ConnectionProfile],
    remembered: Option<&str>,
) -> Option<&'a ConnectionProfile> {
    if let Some(name) = remembered
        && let Some(profile) = profiles.iter().find(|p| p.name == name)
    {
        return Some(profile);
    }
    profiles.iter().min_by(|a, b| a.name.cmp(&b.name))
}
