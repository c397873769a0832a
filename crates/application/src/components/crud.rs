//! CRUD orchestrator
//!
//! Writes records and single fields. Operates on a [`RecordCache`] passed by
//! `&mut` so the open record and key listing stay in step with what was
//! written.

use std::sync::Arc;

use keydesk_domain::{
    Confirmation, DomainError, Outcome, PendingEdit, Record, RecordDraft, UpsertState, WriteKind,
};

use super::record_cache::RecordCache;
use crate::error::{ApplicationError, ApplicationResult, remote};
use crate::ports::{Clock, Confirmer, RecordApi};

/// Prefix of synthesized field names.
pub const NEW_FIELD_PREFIX: &str = "new_key_";

/// Creates, updates and deletes records and fields.
pub struct CrudOrchestrator<A, K> {
    api: Arc<A>,
    clock: K,
}

impl<A: RecordApi, K: Clock> CrudOrchestrator<A, K> {
    /// Creates an orchestrator.
    pub const fn new(api: Arc<A>, clock: K) -> Self {
        Self { api, clock }
    }

    /// Writes a draft, creating the key or replacing it whole.
    ///
    /// The key is read first: a hit leads to one update, a not-found to one
    /// create. Any other read failure aborts without writing. The key list
    /// is refreshed afterwards; a refresh failure is logged, not returned.
    ///
    /// # Errors
    /// Fails on an invalid draft (no call is made), a failed read, or a
    /// failed write.
    pub async fn upsert(
        &self,
        connection: &str,
        draft: &RecordDraft,
        cache: &mut RecordCache<A>,
    ) -> ApplicationResult<WriteKind> {
        let record = draft.build()?;
        let key = draft.key.as_str();

        let found = match self.api.get_record(connection, key).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(remote("read record")(e)),
        };
        let mut state = UpsertState::Unknown.observe(found);

        match state.write_kind() {
            Some(WriteKind::Created) => self
                .api
                .create_record(connection, key, &record)
                .await
                .map_err(remote("create record"))?,
            Some(WriteKind::Updated) => self
                .api
                .update_record(connection, key, &record)
                .await
                .map_err(remote("update record"))?,
            None => {}
        }
        state = state.complete();
        let kind = state.written().ok_or_else(|| {
            ApplicationError::Internal(format!("upsert ended in {state:?} without a write"))
        })?;
        tracing::info!(connection, key, %kind, fields = record.len(), "record written");

        if let Some(open) = cache.open_mut()
            && open.key == key
        {
            open.record = record;
            open.pending = None;
        }
        refresh_quietly(cache, connection).await;
        Ok(kind)
    }

    /// Deletes a record after confirmation.
    ///
    /// Closes it if it is open, then refreshes the key list.
    ///
    /// # Errors
    /// Fails if the backend rejects the delete.
    pub async fn delete_record(
        &self,
        connection: &str,
        key: &str,
        cache: &mut RecordCache<A>,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome> {
        if !confirmer
            .confirm(&Confirmation::DeleteRecord(key.to_string()))
            .await
        {
            return Ok(Outcome::Cancelled);
        }

        self.api
            .delete_record(connection, key)
            .await
            .map_err(remote("delete record"))?;
        tracing::info!(connection, key, "record deleted");

        if cache.open_record().is_some_and(|open| open.key == key) {
            cache.close();
        }
        refresh_quietly(cache, connection).await;
        Ok(Outcome::Done(()))
    }

    /// Opens a fresh, unused field for editing and returns its name.
    ///
    /// The name is derived from the current time. Nothing is written until
    /// the edit is saved.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NoOpenRecord`] if no record is open.
    pub fn add_key_value(&self, cache: &mut RecordCache<A>) -> ApplicationResult<String> {
        let open = cache.open_mut().ok_or(ApplicationError::NoOpenRecord)?;
        let base = format!("{NEW_FIELD_PREFIX}{}", self.clock.epoch_millis());
        let field = open.record.unused_field_name(&base);
        open.pending = Some(PendingEdit::for_new_field(field.clone()));
        Ok(field)
    }

    /// Commits the pending edit by sending the whole record as one update.
    ///
    /// The edit is applied to a copy; the open record and the pending edit
    /// change only once the update succeeds.
    ///
    /// # Errors
    /// Fails with no record open, no pending edit, a blank field name, or a
    /// failed update.
    pub async fn save_edit(
        &self,
        connection: &str,
        cache: &mut RecordCache<A>,
    ) -> ApplicationResult<()> {
        let open = cache.open_mut().ok_or(ApplicationError::NoOpenRecord)?;
        let edit = open.pending.as_ref().ok_or(ApplicationError::NoPendingEdit)?;

        let mut updated = open.record.clone();
        updated.apply_edit(edit)?;

        self.api
            .update_record(connection, &open.key, &updated)
            .await
            .map_err(remote("save field"))?;
        tracing::info!(
            connection,
            key = %open.key,
            field = %edit.new_field,
            renamed = edit.is_rename(),
            "field saved"
        );

        open.record = updated;
        open.pending = None;
        Ok(())
    }

    /// Removes one field after confirmation and sends the whole record.
    ///
    /// # Errors
    /// Fails with no record open, an unknown field, or a failed update.
    pub async fn delete_key_value(
        &self,
        connection: &str,
        field: &str,
        cache: &mut RecordCache<A>,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome> {
        let open = cache.open_mut().ok_or(ApplicationError::NoOpenRecord)?;
        if !open.record.contains(field) {
            return Err(DomainError::UnknownField(field.to_string()).into());
        }
        if !confirmer
            .confirm(&Confirmation::DeleteField(field.to_string()))
            .await
        {
            return Ok(Outcome::Cancelled);
        }

        let mut updated: Record = open.record.clone();
        updated.remove(field);

        self.api
            .update_record(connection, &open.key, &updated)
            .await
            .map_err(remote("delete field"))?;
        tracing::info!(connection, key = %open.key, field, "field deleted");

        open.record = updated;
        if open
            .pending
            .as_ref()
            .is_some_and(|edit| edit.original_field == field)
        {
            open.pending = None;
        }
        Ok(Outcome::Done(()))
    }
}

async fn refresh_quietly<A: RecordApi>(cache: &mut RecordCache<A>, connection: &str) {
    if let Err(e) = cache.refresh(connection).await {
        tracing::warn!(connection, error = %e, "key refresh after write failed");
    }
}
