//! In-memory port fakes shared by the component tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::significant_drop_tightening)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use keydesk_domain::{
    Confirmation, ConnectionProfile, ExportArtifact, ModelProfile, Record, SearchHit,
    SearchRequest,
};

use crate::ports::{
    BackendError, BackendResult, ClientStateError, ClientStateStore, Clock, Confirmer,
    ConnectionApi, ExportError, ExportSink, ModelApi, RecordApi, SearchApi,
};

/// A backend call, as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListConnections,
    GetConnection(String),
    SaveConnection(ConnectionProfile),
    DeleteConnection(String),
    ListKeys(String),
    GetRecord(String),
    CreateRecord(String, Record),
    UpdateRecord(String, Record),
    DeleteRecord(String),
    Export(String),
    Search(SearchRequest),
    ListModels,
    SaveModel(ModelProfile),
    DeleteModel(String),
    CurrentModel,
    SetCurrentModel(String),
}

#[derive(Default)]
struct Store {
    connections: BTreeMap<String, ConnectionProfile>,
    records: BTreeMap<(String, String), Record>,
    models: BTreeMap<String, ModelProfile>,
    current_model: Option<String>,
    search_hits: Vec<SearchHit>,
    failures: HashMap<&'static str, BackendError>,
    calls: Vec<Call>,
}

/// A backend holding everything in memory and recording every call.
#[derive(Default)]
pub struct InMemoryBackend {
    store: Mutex<Store>,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_connection(&self, name: &str) {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.connections.insert(
            name.to_string(),
            ConnectionProfile::new(name, "localhost", 6379),
        );
    }

    pub fn add_record(&self, connection: &str, key: &str, record: Value) {
        let record: Record = serde_json::from_value(record).expect("record");
        let mut store = self.store.lock().expect("Lock poisoned");
        store
            .records
            .insert((connection.to_string(), key.to_string()), record);
    }

    pub fn record(&self, connection: &str, key: &str) -> Option<Record> {
        let store = self.store.lock().expect("Lock poisoned");
        store
            .records
            .get(&(connection.to_string(), key.to_string()))
            .cloned()
    }

    pub fn add_model(&self, profile: ModelProfile) {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.models.insert(profile.name.clone(), profile);
    }

    pub fn stored_model(&self, name: &str) -> Option<ModelProfile> {
        let store = self.store.lock().expect("Lock poisoned");
        store.models.get(name).cloned()
    }

    pub fn set_current(&self, name: Option<&str>) {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.current_model = name.map(String::from);
    }

    pub fn set_search_hits(&self, hits: Vec<SearchHit>) {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.search_hits = hits;
    }

    /// Makes every call of `operation` fail with `error` until cleared.
    pub fn fail(&self, operation: &'static str, error: BackendError) {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.failures.insert(operation, error);
    }

    pub fn clear_failure(&self, operation: &'static str) {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.failures.remove(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.store.lock().expect("Lock poisoned").calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn reset_calls(&self) {
        self.store.lock().expect("Lock poisoned").calls.clear();
    }

    fn begin(&self, operation: &'static str, call: Call) -> BackendResult<MutexGuard<'_, Store>> {
        let mut store = self.store.lock().expect("Lock poisoned");
        store.calls.push(call);
        if let Some(error) = store.failures.get(operation) {
            return Err(error.clone());
        }
        Ok(store)
    }
}

fn glob_match(pattern: &[char], text: &[char]) -> bool {
    match (pattern.first(), text.first()) {
        (None, None) => true,
        (Some('*'), _) => {
            glob_match(&pattern[1..], text) || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        (Some('?'), Some(_)) => glob_match(&pattern[1..], &text[1..]),
        (Some(p), Some(t)) if p == t => glob_match(&pattern[1..], &text[1..]),
        _ => false,
    }
}

fn matches_pattern(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    glob_match(&pattern, &key)
}

#[async_trait]
impl ConnectionApi for InMemoryBackend {
    async fn list_connection_names(&self) -> BackendResult<Vec<String>> {
        let store = self.begin("list_connections", Call::ListConnections)?;
        Ok(store.connections.keys().cloned().collect())
    }

    async fn get_connection(&self, name: &str) -> BackendResult<ConnectionProfile> {
        let store = self.begin("get_connection", Call::GetConnection(name.to_string()))?;
        store
            .connections
            .get(name)
            .map(|profile| ConnectionProfile {
                password: None,
                ..profile.clone()
            })
            .ok_or_else(|| BackendError::NotFound(name.to_string()))
    }

    async fn save_connection(&self, profile: &ConnectionProfile) -> BackendResult<()> {
        let mut store = self.begin("save_connection", Call::SaveConnection(profile.clone()))?;
        store
            .connections
            .insert(profile.name.clone(), profile.clone());
        Ok(())
    }

    async fn delete_connection(&self, name: &str) -> BackendResult<()> {
        let mut store = self.begin("delete_connection", Call::DeleteConnection(name.to_string()))?;
        store
            .connections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl RecordApi for InMemoryBackend {
    async fn list_keys(&self, connection: &str, pattern: &str) -> BackendResult<Vec<String>> {
        let store = self.begin("list_keys", Call::ListKeys(pattern.to_string()))?;
        Ok(store
            .records
            .keys()
            .filter(|(conn, key)| conn == connection && matches_pattern(pattern, key))
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn get_record(&self, connection: &str, key: &str) -> BackendResult<Record> {
        let store = self.begin("get_record", Call::GetRecord(key.to_string()))?;
        store
            .records
            .get(&(connection.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(key.to_string()))
    }

    async fn create_record(
        &self,
        connection: &str,
        key: &str,
        record: &Record,
    ) -> BackendResult<()> {
        let mut store = self.begin(
            "create_record",
            Call::CreateRecord(key.to_string(), record.clone()),
        )?;
        let id = (connection.to_string(), key.to_string());
        if store.records.contains_key(&id) {
            return Err(BackendError::Rejected {
                status: 500,
                detail: "key exists".to_string(),
            });
        }
        store.records.insert(id, record.clone());
        Ok(())
    }

    async fn update_record(
        &self,
        connection: &str,
        key: &str,
        record: &Record,
    ) -> BackendResult<()> {
        let mut store = self.begin(
            "update_record",
            Call::UpdateRecord(key.to_string(), record.clone()),
        )?;
        store
            .records
            .insert((connection.to_string(), key.to_string()), record.clone());
        Ok(())
    }

    async fn delete_record(&self, connection: &str, key: &str) -> BackendResult<()> {
        let mut store = self.begin("delete_record", Call::DeleteRecord(key.to_string()))?;
        store
            .records
            .remove(&(connection.to_string(), key.to_string()))
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(key.to_string()))
    }

    async fn export_records(&self, connection: &str, pattern: &str) -> BackendResult<Value> {
        let store = self.begin("export", Call::Export(pattern.to_string()))?;
        let mut payload = Map::new();
        for ((conn, key), record) in &store.records {
            if conn == connection && matches_pattern(pattern, key) {
                payload.insert(key.clone(), serde_json::to_value(record).expect("record"));
            }
        }
        Ok(Value::Object(payload))
    }
}

#[async_trait]
impl SearchApi for InMemoryBackend {
    async fn search(
        &self,
        _connection: &str,
        request: &SearchRequest,
    ) -> BackendResult<Vec<SearchHit>> {
        let store = self.begin("search", Call::Search(request.clone()))?;
        Ok(store.search_hits.clone())
    }
}

#[async_trait]
impl ModelApi for InMemoryBackend {
    async fn list_models(&self) -> BackendResult<Vec<ModelProfile>> {
        let store = self.begin("list_models", Call::ListModels)?;
        Ok(store
            .models
            .values()
            .map(|profile| ModelProfile {
                api_key: None,
                ..profile.clone()
            })
            .collect())
    }

    async fn save_model(&self, profile: &ModelProfile) -> BackendResult<()> {
        let mut store = self.begin("save_model", Call::SaveModel(profile.clone()))?;
        let kept_key = store
            .models
            .get(&profile.name)
            .and_then(|existing| existing.api_key.clone());
        let mut stored = profile.clone();
        if stored.api_key.is_none() {
            stored.api_key = kept_key;
        }
        store.models.insert(profile.name.clone(), stored);
        Ok(())
    }

    async fn delete_model(&self, name: &str) -> BackendResult<()> {
        let mut store = self.begin("delete_model", Call::DeleteModel(name.to_string()))?;
        store
            .models
            .remove(name)
            .ok_or_else(|| BackendError::NotFound(name.to_string()))?;
        if store.current_model.as_deref() == Some(name) {
            store.current_model = None;
        }
        Ok(())
    }

    async fn current_model(&self) -> BackendResult<ModelProfile> {
        let store = self.begin("current_model", Call::CurrentModel)?;
        store
            .current_model
            .as_ref()
            .and_then(|name| store.models.get(name))
            .map(|profile| ModelProfile {
                api_key: None,
                ..profile.clone()
            })
            .ok_or_else(|| BackendError::NotFound("no model selected".to_string()))
    }

    async fn set_current_model(&self, name: &str) -> BackendResult<()> {
        let mut store = self.begin("set_current_model", Call::SetCurrentModel(name.to_string()))?;
        if !store.models.contains_key(name) {
            return Err(BackendError::NotFound(name.to_string()));
        }
        store.current_model = Some(name.to_string());
        Ok(())
    }
}

/// A state store that survives "restarts" by being cloned into each session.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    remembered: Arc<Mutex<Option<String>>>,
}

impl MemoryStateStore {
    pub fn remembered(&self) -> Option<String> {
        self.remembered.lock().expect("Lock poisoned").clone()
    }

    pub fn set(&self, name: &str) {
        *self.remembered.lock().expect("Lock poisoned") = Some(name.to_string());
    }
}

#[async_trait]
impl ClientStateStore for MemoryStateStore {
    async fn remembered_connection(&self) -> Result<Option<String>, ClientStateError> {
        Ok(self.remembered())
    }

    async fn remember_connection(&self, name: &str) -> Result<(), ClientStateError> {
        self.set(name);
        Ok(())
    }

    async fn forget_connection(&self) -> Result<(), ClientStateError> {
        *self.remembered.lock().expect("Lock poisoned") = None;
        Ok(())
    }
}

/// Answers every prompt the same way and records what was asked.
#[derive(Default)]
pub struct ScriptedConfirmer {
    accept: bool,
    asked: Mutex<Vec<Confirmation>>,
}

impl ScriptedConfirmer {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> Vec<Confirmation> {
        self.asked.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, confirmation: &Confirmation) -> bool {
        self.asked
            .lock()
            .expect("Lock poisoned")
            .push(confirmation.clone());
        self.accept
    }
}

/// A clock stuck at one instant.
#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self(Utc.timestamp_millis_opt(millis).single().expect("valid timestamp"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Keeps delivered exports in memory.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<ExportArtifact>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<ExportArtifact> {
        self.delivered.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl ExportSink for RecordingSink {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<String, ExportError> {
        self.delivered
            .lock()
            .expect("Lock poisoned")
            .push(artifact.clone());
        Ok(format!("memory://{}", artifact.file_name))
    }
}
