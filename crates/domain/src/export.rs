//! Bulk export artifacts.

use serde_json::Value;

/// A downloadable export of the records matching a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// File name, `<connection>-export.json`.
    pub file_name: String,
    /// Pretty-printed JSON payload.
    pub contents: String,
}

impl ExportArtifact {
    /// Wraps a bulk-export payload for the given connection.
    ///
    /// The payload is passed through verbatim, only re-indented.
    #[must_use]
    pub fn new(connection: &str, payload: &Value) -> Self {
        Self {
            file_name: Self::file_name_for(connection),
            contents: serde_json::to_string_pretty(payload)
                .unwrap_or_else(|_| payload.to_string()),
        }
    }

    /// The export file name for a connection.
    #[must_use]
    pub fn file_name_for(connection: &str) -> String {
        format!("{connection}-export.json")
    }
}
