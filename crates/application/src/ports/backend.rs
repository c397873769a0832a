//! Backend ports
//!
//! The REST boundary, split by resource. One adapter usually implements
//! all four traits.

use async_trait::async_trait;
use serde_json::Value;

use keydesk_domain::{ConnectionProfile, ModelProfile, Record, SearchHit, SearchRequest};

/// Errors returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error detail reported by the backend.
        detail: String,
    },

    /// The backend could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Returns true for the not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Connection profile endpoints.
#[async_trait]
pub trait ConnectionApi: Send + Sync {
    /// Lists the names of all stored connection profiles.
    async fn list_connection_names(&self) -> BackendResult<Vec<String>>;

    /// Fetches one profile by name.
    ///
    /// # Errors
    /// Returns `BackendError::NotFound` if no profile has that name.
    async fn get_connection(&self, name: &str) -> BackendResult<ConnectionProfile>;

    /// Creates or replaces a profile, keyed by its name.
    async fn save_connection(&self, profile: &ConnectionProfile) -> BackendResult<()>;

    /// Deletes a profile by name.
    async fn delete_connection(&self, name: &str) -> BackendResult<()>;
}

/// Record endpoints, scoped to a named connection.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Lists the keys matching a glob pattern.
    async fn list_keys(&self, connection: &str, pattern: &str) -> BackendResult<Vec<String>>;

    /// Reads a record.
    ///
    /// # Errors
    /// Returns `BackendError::NotFound` if the key does not exist.
    async fn get_record(&self, connection: &str, key: &str) -> BackendResult<Record>;

    /// Creates a record. Fails if the key exists.
    async fn create_record(&self, connection: &str, key: &str, record: &Record)
    -> BackendResult<()>;

    /// Replaces a whole record.
    async fn update_record(&self, connection: &str, key: &str, record: &Record)
    -> BackendResult<()>;

    /// Deletes a record.
    async fn delete_record(&self, connection: &str, key: &str) -> BackendResult<()>;

    /// Fetches every record matching a pattern as one payload.
    async fn export_records(&self, connection: &str, pattern: &str) -> BackendResult<Value>;
}

/// Semantic search endpoint.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Runs a query against one sub-collection of a connection.
    async fn search(&self, connection: &str, request: &SearchRequest)
    -> BackendResult<Vec<SearchHit>>;
}

/// Model profile endpoints.
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Lists all model profiles. API keys are never included.
    async fn list_models(&self) -> BackendResult<Vec<ModelProfile>>;

    /// Creates or replaces a model profile. A missing API key keeps the stored one.
    async fn save_model(&self, profile: &ModelProfile) -> BackendResult<()>;

    /// Deletes a model profile.
    async fn delete_model(&self, name: &str) -> BackendResult<()>;

    /// Fetches the model the backend currently uses.
    ///
    /// # Errors
    /// Fails when no model is selected.
    async fn current_model(&self) -> BackendResult<ModelProfile>;

    /// Makes a profile the current model.
    async fn set_current_model(&self, name: &str) -> BackendResult<()>;
}
