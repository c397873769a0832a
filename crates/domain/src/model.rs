//! Inference model profiles.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, require_non_blank};

/// Placeholder shown instead of a stored API key.
pub const MASKED_SECRET: &str = "********";

/// Kind of model served by an endpoint.
///
/// The backend stores the kind as free text. Kinds other than `chat` and
/// `embedding` are kept verbatim so they survive a read-edit-save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelType {
    /// Chat completion model.
    #[default]
    Chat,
    /// Embedding model.
    Embedding,
    /// Any other kind the backend reports.
    Other(String),
}

impl ModelType {
    /// The kind as the backend spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chat => "chat",
            Self::Embedding => "embedding",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for ModelType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "chat" => Self::Chat,
            "embedding" => Self::Embedding,
            _ => Self::Other(kind),
        }
    }
}

impl From<ModelType> for String {
    fn from(kind: ModelType) -> Self {
        match kind {
            ModelType::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named inference endpoint.
///
/// The API key is write-only: the backend never returns it, so profiles
/// read back from the backend carry `api_key: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Unique profile name.
    pub name: String,
    /// Endpoint URL.
    pub url: String,
    /// API key. Omitted from payloads when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model kind.
    #[serde(default)]
    pub model_type: ModelType,
}

impl ModelProfile {
    /// Creates a profile without an API key.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api_key: None,
            model_type,
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Whether a model form creates a new profile or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// A new profile.
    #[default]
    Create,
    /// An existing profile opened for editing.
    Edit,
}

/// A model profile form, as opened for create or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDraft {
    /// Create or edit.
    pub mode: EditMode,
    /// Form contents.
    pub profile: ModelProfile,
}

impl ModelDraft {
    /// An empty creation form.
    #[must_use]
    pub fn create(profile: ModelProfile) -> Self {
        Self {
            mode: EditMode::Create,
            profile,
        }
    }

    /// Opens an existing profile for editing, masking its API key.
    #[must_use]
    pub fn edit(profile: &ModelProfile) -> Self {
        Self {
            mode: EditMode::Edit,
            profile: ModelProfile {
                api_key: Some(MASKED_SECRET.to_string()),
                ..profile.clone()
            },
        }
    }

    /// Returns true if the key field still holds the placeholder.
    #[must_use]
    pub fn key_is_masked(&self) -> bool {
        self.profile.api_key.as_deref() == Some(MASKED_SECRET)
    }

    /// Builds the payload to save.
    ///
    /// When editing with the placeholder still in place, the key is left out
    /// so the stored secret is kept.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyName`] if the name is blank.
    pub fn into_payload(self) -> DomainResult<ModelProfile> {
        require_non_blank(&self.profile.name, DomainError::EmptyName)?;
        let keep_stored_key = self.mode == EditMode::Edit && self.key_is_masked();
        let mut profile = self.profile;
        if keep_stored_key {
            profile.api_key = None;
        }
        Ok(profile)
    }
}
