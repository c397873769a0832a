//! Writes export artifacts as files.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use keydesk_application::ports::{ExportError, ExportSink};
use keydesk_domain::ExportArtifact;

/// Writes each artifact into a directory under its own file name,
/// replacing any previous export of the same connection.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    /// Creates a sink writing into `dir`. The directory is created on demand.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<String, ExportError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.file_name);
        fs::write(&path, artifact.contents.as_bytes()).await?;
        tracing::debug!(path = %path.display(), bytes = artifact.contents.len(), "export written");
        Ok(path.display().to_string())
    }
}
