//! CLI error types

use keydesk_application::ApplicationError;
use keydesk_infrastructure::{RestBackendError, SettingsError};
use thiserror::Error;

/// Errors reported by a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Backend(#[from] RestBackendError),

    /// A client operation failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// A local file could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Output could not be written.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Output could not be rendered as JSON.
    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),
}
