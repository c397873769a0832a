//! Application error types

use keydesk_domain::DomainError;
use thiserror::Error;

use crate::ports::{BackendError, ClientStateError, ExportError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Input failed validation; no remote call was made.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// A remote call failed.
    #[error("{operation} failed: {source}")]
    Remote {
        /// What the client was doing.
        operation: &'static str,
        /// Backend error.
        #[source]
        source: BackendError,
    },

    /// The operation needs an active connection.
    #[error("no active connection")]
    NoActiveConnection,

    /// The named connection is not in the registry.
    #[error("unknown connection: {0}")]
    UnknownConnection(String),

    /// The named model is not in the registry.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The operation needs an open record.
    #[error("no record is open")]
    NoOpenRecord,

    /// The operation needs a field edit in progress.
    #[error("no field edit in progress")]
    NoPendingEdit,

    /// Client-local state could not be read or written.
    #[error("client state error: {0}")]
    ClientState(#[from] ClientStateError),

    /// The export could not be delivered.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Returns true for validation errors.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the backend error behind a remote failure.
    #[must_use]
    pub const fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Builds a mapper from `BackendError` to [`ApplicationError::Remote`].
pub(crate) fn remote(operation: &'static str) -> impl FnOnce(BackendError) -> ApplicationError {
    move |source| {
        tracing::warn!(operation, error = %source, "remote call failed");
        ApplicationError::Remote { operation, source }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
