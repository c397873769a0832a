//! Record cache
//!
//! The key listing of the active connection, the open record and the field
//! edit in progress.

use std::sync::Arc;

use keydesk_domain::{DomainError, ExportArtifact, KeyEntry, KeyListState, PendingEdit, Record};

use crate::error::{ApplicationError, ApplicationResult, remote};
use crate::ports::{ExportSink, RecordApi};

/// Pattern used when none was given.
pub const DEFAULT_PATTERN: &str = "*";

/// The record shown for editing.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRecord {
    /// Record key.
    pub key: String,
    /// Field mapping as last read or written.
    pub record: Record,
    /// Field edit in progress, if any.
    pub pending: Option<PendingEdit>,
}

/// Key listing and open record for one connection.
pub struct RecordCache<A> {
    api: Arc<A>,
    keys: Vec<KeyEntry>,
    key_state: KeyListState,
    pattern: String,
    open: Option<OpenRecord>,
}

impl<A: RecordApi> RecordCache<A> {
    /// Creates an empty cache.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            keys: Vec::new(),
            key_state: KeyListState::Unloaded,
            pattern: DEFAULT_PATTERN.to_string(),
            open: None,
        }
    }

    /// Keys from the last listing.
    #[must_use]
    pub fn keys(&self) -> &[KeyEntry] {
        &self.keys
    }

    /// Whether the listing is confirmed, failed or not yet loaded.
    #[must_use]
    pub const fn key_state(&self) -> &KeyListState {
        &self.key_state
    }

    /// Last-used pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The open record.
    #[must_use]
    pub const fn open_record(&self) -> Option<&OpenRecord> {
        self.open.as_ref()
    }

    /// The field edit in progress.
    #[must_use]
    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.open.as_ref()?.pending.as_ref()
    }

    /// Mutable access to the field edit in progress, to change its name or value.
    pub fn pending_edit_mut(&mut self) -> Option<&mut PendingEdit> {
        self.open.as_mut()?.pending.as_mut()
    }

    pub(crate) const fn open_mut(&mut self) -> Option<&mut OpenRecord> {
        self.open.as_mut()
    }

    /// Forgets everything, e.g. when the active connection changes.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.key_state = KeyListState::Unloaded;
        self.pattern = DEFAULT_PATTERN.to_string();
        self.open = None;
    }

    /// Closes the open record and drops its pending edit.
    pub fn close(&mut self) {
        self.open = None;
    }

    /// Lists keys matching `pattern`, or the last-used pattern when `None`.
    ///
    /// A blank pattern means `*`. The list is cleared before the call, so a
    /// failure leaves it empty with [`KeyListState::Failed`].
    ///
    /// # Errors
    /// Returns [`ApplicationError::Remote`] if the listing fails.
    pub async fn refresh_keys(
        &mut self,
        connection: &str,
        pattern: Option<&str>,
    ) -> ApplicationResult<&[KeyEntry]> {
        if let Some(pattern) = pattern {
            let pattern = pattern.trim();
            self.pattern = if pattern.is_empty() {
                DEFAULT_PATTERN
            } else {
                pattern
            }
            .to_string();
        }

        self.keys.clear();
        let listed = self.api.list_keys(connection, &self.pattern).await;
        match listed {
            Ok(keys) => {
                tracing::debug!(connection, pattern = %self.pattern, count = keys.len(), "keys listed");
                self.keys = keys.into_iter().map(KeyEntry::from).collect();
                self.key_state = KeyListState::Loaded;
                Ok(&self.keys)
            }
            Err(e) => {
                self.key_state = KeyListState::Failed {
                    message: e.to_string(),
                };
                Err(remote("list keys")(e))
            }
        }
    }

    /// Lists keys again with the last-used pattern.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Remote`] if the listing fails.
    pub async fn refresh(&mut self, connection: &str) -> ApplicationResult<&[KeyEntry]> {
        self.refresh_keys(connection, None).await
    }

    /// Fetches a record and makes it the open one.
    ///
    /// Any previous pending edit is discarded. On failure the previous open
    /// record is kept.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Remote`] if the read fails.
    pub async fn open(&mut self, connection: &str, key: &str) -> ApplicationResult<&OpenRecord> {
        let record = self
            .api
            .get_record(connection, key)
            .await
            .map_err(remote("open record"))?;
        tracing::debug!(connection, key, fields = record.len(), "record opened");
        Ok(&*self.open.insert(OpenRecord {
            key: key.to_string(),
            record,
            pending: None,
        }))
    }

    /// Starts editing an existing field of the open record.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NoOpenRecord`] or a validation error if
    /// the field does not exist.
    pub fn begin_edit(&mut self, field: &str) -> ApplicationResult<&mut PendingEdit> {
        let open = self.open.as_mut().ok_or(ApplicationError::NoOpenRecord)?;
        let value = open
            .record
            .get(field)
            .ok_or_else(|| DomainError::UnknownField(field.to_string()))?;
        let edit = PendingEdit::for_field(field, value);
        Ok(open.pending.insert(edit))
    }

    /// Drops the pending edit without saving.
    pub fn cancel_edit(&mut self) {
        if let Some(open) = self.open.as_mut() {
            open.pending = None;
        }
    }

    /// Fetches every record matching `pattern` and hands the payload to `sink`.
    ///
    /// Local state is not touched. Returns where the artifact went.
    ///
    /// # Errors
    /// Fails if the export call fails or the sink cannot deliver.
    pub async fn export_matching(
        &self,
        connection: &str,
        pattern: &str,
        sink: &dyn ExportSink,
    ) -> ApplicationResult<String> {
        let pattern = if pattern.trim().is_empty() {
            DEFAULT_PATTERN
        } else {
            pattern
        };
        let payload = self
            .api
            .export_records(connection, pattern)
            .await
            .map_err(remote("export"))?;
        let artifact = ExportArtifact::new(connection, &payload);
        let location = sink.deliver(&artifact).await?;
        tracing::info!(connection, pattern, %location, "export delivered");
        Ok(location)
    }
}
