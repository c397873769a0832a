//! Client session
//!
//! Wires the components together around the active connection. Switching
//! connection re-derives record and search state from scratch.

use std::sync::Arc;

use keydesk_domain::{
    ConnectionProfile, KeyEntry, Outcome, PendingEdit, RecordDraft, SearchHit, SearchRequest,
    WriteKind,
};

use crate::components::{
    ConnectionRegistry, CrudOrchestrator, ModelRegistry, OpenRecord, RecordCache, SearchSession,
};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{
    ClientStateStore, Clock, Confirmer, ConnectionApi, ExportSink, ModelApi, RecordApi, SearchApi,
};

/// Everything the client holds for one operator.
pub struct Session<B, S, K> {
    connections: ConnectionRegistry<B, S>,
    records: RecordCache<B>,
    crud: CrudOrchestrator<B, K>,
    search: SearchSession<B>,
    models: ModelRegistry<B>,
    /// Connection the record and search state were derived from.
    scope: Option<String>,
}

impl<B, S, K> Session<B, S, K>
where
    B: ConnectionApi + RecordApi + SearchApi + ModelApi,
    S: ClientStateStore,
    K: Clock,
{
    /// Creates a session. Nothing is loaded until [`Self::start`].
    pub fn new(backend: Arc<B>, state_store: S, clock: K) -> Self {
        Self {
            connections: ConnectionRegistry::new(Arc::clone(&backend), state_store),
            records: RecordCache::new(Arc::clone(&backend)),
            crud: CrudOrchestrator::new(Arc::clone(&backend), clock),
            search: SearchSession::new(Arc::clone(&backend)),
            models: ModelRegistry::new(backend),
            scope: None,
        }
    }

    /// Loads connection profiles, auto-selects one and lists its keys.
    ///
    /// A failed key listing is left in [`RecordCache::key_state`]; it does
    /// not fail the start.
    ///
    /// # Errors
    /// Fails if the profiles cannot be loaded or the selection cannot be
    /// remembered.
    pub async fn start(&mut self) -> ApplicationResult<Option<ConnectionProfile>> {
        let restored = self.connections.restore().await;
        match &restored {
            Ok(Some(profile)) => self.enter_connection(&profile.name).await,
            _ => self.settle_scope(),
        }
        restored
    }

    /// The connection registry.
    #[must_use]
    pub const fn connections(&self) -> &ConnectionRegistry<B, S> {
        &self.connections
    }

    /// The record cache of the active connection.
    #[must_use]
    pub const fn records(&self) -> &RecordCache<B> {
        &self.records
    }

    /// The search session of the active connection.
    #[must_use]
    pub const fn search(&self) -> &SearchSession<B> {
        &self.search
    }

    /// Mutable search session, to change the form fields.
    pub const fn search_mut(&mut self) -> &mut SearchSession<B> {
        &mut self.search
    }

    /// The model registry.
    #[must_use]
    pub const fn models(&self) -> &ModelRegistry<B> {
        &self.models
    }

    /// Mutable model registry. Models do not depend on the active connection.
    pub const fn models_mut(&mut self) -> &mut ModelRegistry<B> {
        &mut self.models
    }

    /// Name of the active connection.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NoActiveConnection`] if none is selected.
    pub fn active_connection(&self) -> ApplicationResult<String> {
        self.connections
            .active()
            .map(ToString::to_string)
            .ok_or(ApplicationError::NoActiveConnection)
    }

    /// Re-reads the connection profiles without selecting one.
    ///
    /// # Errors
    /// See [`ConnectionRegistry::load`].
    pub async fn load_connections(&mut self) -> ApplicationResult<()> {
        let loaded = self.connections.load().await;
        self.settle_scope();
        loaded
    }

    /// Creates or replaces a connection profile.
    ///
    /// # Errors
    /// See [`ConnectionRegistry::save_profile`].
    pub async fn save_connection(&mut self, profile: &ConnectionProfile) -> ApplicationResult<()> {
        let saved = self.connections.save_profile(profile).await;
        self.settle_scope();
        saved
    }

    /// Switches to another connection and lists its keys.
    ///
    /// # Errors
    /// See [`ConnectionRegistry::select_active`]. On error the previous
    /// connection stays active with its state untouched.
    pub async fn select_connection(&mut self, name: &str) -> ApplicationResult<ConnectionProfile> {
        let profile = self.connections.select_active(name).await?;
        self.enter_connection(&profile.name).await;
        Ok(profile)
    }

    /// Deletes a connection profile after confirmation.
    ///
    /// Deleting the active one leaves nothing selected and clears record and
    /// search state, even when the reload after the delete fails.
    ///
    /// # Errors
    /// See [`ConnectionRegistry::delete_profile`].
    pub async fn delete_connection(
        &mut self,
        name: &str,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome<bool>> {
        let deleted = self.connections.delete_profile(name, confirmer).await;
        self.settle_scope();
        deleted
    }

    /// Drops record and search state that no longer belongs to the active
    /// connection.
    fn settle_scope(&mut self) {
        if self.connections.active() == self.scope.as_deref() {
            return;
        }
        tracing::debug!(
            from = ?self.scope,
            to = ?self.connections.active(),
            "active connection changed, clearing record and search state"
        );
        self.records.reset();
        self.search.reset();
        self.scope = self.connections.active().map(ToString::to_string);
    }

    async fn enter_connection(&mut self, name: &str) {
        self.scope = Some(name.to_string());
        self.records.reset();
        self.search.reset();
        if let Err(e) = self.records.refresh(name).await {
            tracing::warn!(connection = %name, error = %e, "could not list keys");
        }
    }

    /// Lists keys of the active connection.
    ///
    /// # Errors
    /// See [`RecordCache::refresh_keys`].
    pub async fn refresh_keys(&mut self, pattern: Option<&str>) -> ApplicationResult<&[KeyEntry]> {
        let connection = self.active_connection()?;
        self.records.refresh_keys(&connection, pattern).await
    }

    /// Opens a record of the active connection.
    ///
    /// # Errors
    /// See [`RecordCache::open`].
    pub async fn open_record(&mut self, key: &str) -> ApplicationResult<&OpenRecord> {
        let connection = self.active_connection()?;
        self.records.open(&connection, key).await
    }

    /// Starts editing a field of the open record.
    ///
    /// # Errors
    /// See [`RecordCache::begin_edit`].
    pub fn begin_edit(&mut self, field: &str) -> ApplicationResult<&mut PendingEdit> {
        self.records.begin_edit(field)
    }

    /// The field edit in progress.
    pub fn pending_edit_mut(&mut self) -> Option<&mut PendingEdit> {
        self.records.pending_edit_mut()
    }

    /// Drops the field edit in progress.
    pub fn cancel_edit(&mut self) {
        self.records.cancel_edit();
    }

    /// Writes a record, creating or replacing it.
    ///
    /// # Errors
    /// See [`CrudOrchestrator::upsert`].
    pub async fn upsert(&mut self, draft: &RecordDraft) -> ApplicationResult<WriteKind> {
        let connection = self.active_connection()?;
        self.crud.upsert(&connection, draft, &mut self.records).await
    }

    /// Deletes a record after confirmation.
    ///
    /// # Errors
    /// See [`CrudOrchestrator::delete_record`].
    pub async fn delete_record(
        &mut self,
        key: &str,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome> {
        let connection = self.active_connection()?;
        self.crud
            .delete_record(&connection, key, &mut self.records, confirmer)
            .await
    }

    /// Opens a fresh field of the open record for editing.
    ///
    /// # Errors
    /// See [`CrudOrchestrator::add_key_value`].
    pub fn add_key_value(&mut self) -> ApplicationResult<String> {
        self.crud.add_key_value(&mut self.records)
    }

    /// Commits the pending field edit.
    ///
    /// # Errors
    /// See [`CrudOrchestrator::save_edit`].
    pub async fn save_edit(&mut self) -> ApplicationResult<()> {
        let connection = self.active_connection()?;
        self.crud.save_edit(&connection, &mut self.records).await
    }

    /// Removes a field of the open record after confirmation.
    ///
    /// # Errors
    /// See [`CrudOrchestrator::delete_key_value`].
    pub async fn delete_key_value(
        &mut self,
        field: &str,
        confirmer: &dyn Confirmer,
    ) -> ApplicationResult<Outcome> {
        let connection = self.active_connection()?;
        self.crud
            .delete_key_value(&connection, field, &mut self.records, confirmer)
            .await
    }

    /// Exports every record matching `pattern`.
    ///
    /// # Errors
    /// See [`RecordCache::export_matching`].
    pub async fn export(&self, pattern: &str, sink: &dyn ExportSink) -> ApplicationResult<String> {
        let connection = self.active_connection()?;
        self.records.export_matching(&connection, pattern, sink).await
    }

    /// Runs a semantic search on the active connection.
    ///
    /// # Errors
    /// See [`SearchSession::run_search`].
    pub async fn run_search(&mut self, request: SearchRequest) -> ApplicationResult<&[SearchHit]> {
        let connection = self.active_connection()?;
        self.search.run_search(&connection, request).await
    }

    /// Switches the search to another sub-collection, clearing results.
    pub fn change_sub_collection(&mut self, name: impl Into<String>) {
        self.search.change_sub_collection(name);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::BackendError;
    use crate::testing::{FixedClock, InMemoryBackend, MemoryStateStore, ScriptedConfirmer};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type TestSession = Session<InMemoryBackend, MemoryStateStore, FixedClock>;

    fn session(backend: &Arc<InMemoryBackend>, store: &MemoryStateStore) -> TestSession {
        Session::new(
            Arc::clone(backend),
            store.clone(),
            FixedClock::at_millis(0),
        )
    }

    fn two_connections() -> Arc<InMemoryBackend> {
        let backend = InMemoryBackend::new();
        backend.add_connection("alpha");
        backend.add_connection("beta");
        backend.add_record("alpha", "a:1", json!({"q": "alpha answer"}));
        backend.add_record("beta", "b:1", json!({"q": "beta answer"}));
        backend.add_record("beta", "b:2", json!({"q": "another"}));
        backend
    }

    fn keys(session: &TestSession) -> Vec<String> {
        session.records().keys().iter().map(|k| k.key.clone()).collect()
    }

    #[tokio::test]
    async fn test_start_selects_and_lists_keys() {
        let backend = two_connections();
        let mut session = session(&backend, &MemoryStateStore::default());

        let selected = session.start().await.unwrap();

        assert_eq!(selected.map(|p| p.name), Some("alpha".to_string()));
        assert_eq!(keys(&session), vec!["a:1"]);
    }

    #[tokio::test]
    async fn test_start_survives_failed_key_listing() {
        let backend = two_connections();
        backend.fail("list_keys", BackendError::Transport("down".into()));
        let mut session = session(&backend, &MemoryStateStore::default());

        assert!(session.start().await.unwrap().is_some());
        assert!(session.records().key_state().is_failed());
    }

    #[tokio::test]
    async fn test_operations_need_active_connection() {
        let backend = InMemoryBackend::new();
        let mut session = session(&backend, &MemoryStateStore::default());
        session.start().await.unwrap();

        assert!(matches!(
            session.refresh_keys(None).await,
            Err(ApplicationError::NoActiveConnection)
        ));
        assert!(matches!(
            session
                .upsert(&RecordDraft::manual("k").with_field("a", "1"))
                .await,
            Err(ApplicationError::NoActiveConnection)
        ));
    }

    #[tokio::test]
    async fn test_switching_connection_resets_state() {
        let backend = two_connections();
        backend.set_search_hits(vec![SearchHit {
            key: "q".into(),
            data: json!("a"),
            similarity: 0.9,
        }]);
        let mut session = session(&backend, &MemoryStateStore::default());
        session.start().await.unwrap();
        session.refresh_keys(Some("a:*")).await.unwrap();
        session.open_record("a:1").await.unwrap();
        session
            .run_search(SearchRequest::new("a:1", "question"))
            .await
            .unwrap();

        session.select_connection("beta").await.unwrap();

        assert!(session.records().open_record().is_none());
        assert!(session.search().results().is_empty());
        assert!(session.search().request().sub_collection.is_empty());
        assert_eq!(session.records().pattern(), "*");
        assert_eq!(keys(&session), vec!["b:1", "b:2"]);
    }

    #[tokio::test]
    async fn test_failed_switch_keeps_state() {
        let backend = two_connections();
        let mut session = session(&backend, &MemoryStateStore::default());
        session.start().await.unwrap();
        session.open_record("a:1").await.unwrap();

        assert!(session.select_connection("gamma").await.is_err());

        assert_eq!(session.active_connection().unwrap(), "alpha");
        assert!(session.records().open_record().is_some());
    }

    #[tokio::test]
    async fn test_restart_scenario_end_to_end() {
        let backend = two_connections();
        let store = MemoryStateStore::default();
        let confirmer = ScriptedConfirmer::accepting();

        let mut first = session(&backend, &store);
        first.start().await.unwrap();
        assert_eq!(first.active_connection().unwrap(), "alpha");
        first.select_connection("beta").await.unwrap();

        let mut second = session(&backend, &store);
        second.start().await.unwrap();
        assert_eq!(second.active_connection().unwrap(), "beta");
        second.open_record("b:1").await.unwrap();

        let outcome = second.delete_connection("beta", &confirmer).await.unwrap();
        assert_eq!(outcome, Outcome::Done(true));
        assert!(second.active_connection().is_err());
        assert!(second.records().open_record().is_none());
        assert!(second.records().keys().is_empty());
        assert!(store.remembered().is_none());

        let mut third = session(&backend, &store);
        third.start().await.unwrap();
        assert_eq!(third.active_connection().unwrap(), "alpha");
    }

    #[tokio::test]
    async fn test_delete_active_clears_state_when_reload_fails() {
        let backend = two_connections();
        backend.set_search_hits(vec![SearchHit {
            key: "q".into(),
            data: json!("a"),
            similarity: 0.9,
        }]);
        let store = MemoryStateStore::default();
        let mut session = session(&backend, &store);
        session.start().await.unwrap();
        session.open_record("a:1").await.unwrap();
        session
            .run_search(SearchRequest::new("faq", "question"))
            .await
            .unwrap();
        backend.fail("list_connections", BackendError::Transport("down".into()));

        let result = session
            .delete_connection("alpha", &ScriptedConfirmer::accepting())
            .await;

        assert!(result.is_err());
        assert!(session.active_connection().is_err());
        assert!(store.remembered().is_none());
        assert!(session.records().keys().is_empty());
        assert!(session.records().open_record().is_none());
        assert!(session.search().results().is_empty());
    }

    #[tokio::test]
    async fn test_reload_dropping_active_clears_state() {
        let backend = two_connections();
        let mut session = session(&backend, &MemoryStateStore::default());
        session.start().await.unwrap();
        session.open_record("a:1").await.unwrap();
        backend.delete_connection("alpha").await.unwrap();

        session.load_connections().await.unwrap();

        assert!(session.active_connection().is_err());
        assert!(session.records().keys().is_empty());
        assert!(session.records().open_record().is_none());
    }

    #[tokio::test]
    async fn test_reload_keeping_active_keeps_state() {
        let backend = two_connections();
        let mut session = session(&backend, &MemoryStateStore::default());
        session.start().await.unwrap();
        session.open_record("a:1").await.unwrap();

        session
            .save_connection(&ConnectionProfile::new("gamma", "localhost", 6379))
            .await
            .unwrap();

        assert_eq!(session.active_connection().unwrap(), "alpha");
        assert_eq!(keys(&session), vec!["a:1"]);
        assert!(session.records().open_record().is_some());
    }

    #[tokio::test]
    async fn test_edit_flow_through_session() {
        let backend = two_connections();
        let mut session = session(&backend, &MemoryStateStore::default());
        session.start().await.unwrap();
        session.open_record("a:1").await.unwrap();

        let field = session.add_key_value().unwrap();
        assert_eq!(field, "new_key_0");
        session.pending_edit_mut().unwrap().raw_value = "{\"n\": 1}".to_string();
        session.save_edit().await.unwrap();

        let stored = backend.record("alpha", "a:1").unwrap();
        assert_eq!(
            serde_json::to_value(&stored).unwrap(),
            json!({"q": "alpha answer", "new_key_0": {"n": 1}})
        );
    }
}
