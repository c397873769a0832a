//! Export delivery port.

use async_trait::async_trait;
use keydesk_domain::ExportArtifact;

/// Errors raised while delivering an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives export artifacts, e.g. by writing them as files.
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Delivers the artifact and returns where it went.
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<String, ExportError>;
}
