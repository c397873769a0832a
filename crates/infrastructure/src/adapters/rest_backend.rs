//! REST backend adapter using reqwest.
//!
//! Implements the backend ports against the store service's JSON API.
//! Path segments are percent-encoded, so keys and names may contain `/`,
//! spaces or any other character.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use keydesk_application::ports::{
    BackendError, BackendResult, ConnectionApi, ModelApi, RecordApi, SearchApi,
};
use keydesk_domain::{
    ClientSettings, ConnectionProfile, ModelProfile, ModelType, Record, SearchHit, SearchRequest,
};

/// Errors raised while constructing a [`RestBackend`].
#[derive(Debug, thiserror::Error)]
pub enum RestBackendError {
    /// The configured base URL cannot be used.
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct NamesBody {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct ConfigBody {
    config: ConnectionProfile,
}

#[derive(Deserialize)]
struct KeysBody {
    keys: Vec<String>,
}

#[derive(Deserialize)]
struct DataBody<T> {
    data: T,
}

#[derive(Deserialize)]
struct ResultsBody {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct ModelConfigsBody {
    configs: BTreeMap<String, StoredModel>,
}

#[derive(Deserialize)]
struct CurrentModelBody {
    model: StoredModel,
}

/// A model profile as the backend returns it: never with a key, and with
/// the name sometimes only present as the map key.
#[derive(Deserialize)]
struct StoredModel {
    #[serde(default)]
    name: Option<String>,
    url: String,
    #[serde(default)]
    model_type: ModelType,
}

impl StoredModel {
    fn into_profile(self, fallback_name: &str) -> ModelProfile {
        let name = self.name.unwrap_or_else(|| fallback_name.to_string());
        ModelProfile::new(name, self.url, self.model_type)
    }
}

/// Backend client for the store service.
pub struct RestBackend {
    client: Client,
    base_url: Url,
}

impl RestBackend {
    /// Creates a backend client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// built.
    pub fn new(settings: &ClientSettings) -> Result<Self, RestBackendError> {
        let client = Client::builder()
            .user_agent(concat!("keydesk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Self::with_client(client, &settings.api_base_url)
    }

    /// Creates a backend client with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, RestBackendError> {
        let invalid = |reason: String| RestBackendError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// The base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Transport("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> BackendResult<Url> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Sends a request and turns non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        let response = builder.send().await.map_err(Self::map_error)?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let detail = Self::error_detail(response).await;
        if status == StatusCode::NOT_FOUND {
            Err(BackendError::NotFound(detail))
        } else {
            Err(BackendError::Rejected {
                status: status.as_u16(),
                detail,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> BackendResult<T> {
        let response = self.send(self.client.get(url)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    /// Extracts the `detail` message of an error body, else the raw text.
    async fn error_detail(response: Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(body)) => match body.get("detail") {
                Some(Value::String(detail)) => detail.clone(),
                Some(other) => other.to_string(),
                None => text,
            },
            _ => text,
        };
        if detail.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            detail
        }
    }

    /// Maps reqwest errors to `BackendError`.
    fn map_error(error: reqwest::Error) -> BackendError {
        if error.is_timeout() {
            return BackendError::Transport(format!("request timed out: {error}"));
        }
        if error.is_connect() {
            return BackendError::Transport(format!("could not connect: {error}"));
        }
        if error.is_decode() {
            return BackendError::InvalidResponse(error.to_string());
        }
        BackendError::Transport(error.to_string())
    }
}

#[async_trait]
impl ConnectionApi for RestBackend {
    async fn list_connection_names(&self) -> BackendResult<Vec<String>> {
        let url = self.endpoint(&["database", "configs"])?;
        let body: NamesBody = self.get_json(url).await?;
        Ok(body.names)
    }

    async fn get_connection(&self, name: &str) -> BackendResult<ConnectionProfile> {
        let url = self.endpoint(&["database", "config", name])?;
        let body: ConfigBody = self.get_json(url).await?;
        Ok(body.config)
    }

    async fn save_connection(&self, profile: &ConnectionProfile) -> BackendResult<()> {
        let url = self.endpoint(&["database", "config"])?;
        self.send(self.client.post(url).json(profile)).await?;
        Ok(())
    }

    async fn delete_connection(&self, name: &str) -> BackendResult<()> {
        let url = self.endpoint(&["database", "config", "delete"])?;
        self.send(self.client.post(url).json(&json!({ "name": name })))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordApi for RestBackend {
    async fn list_keys(&self, connection: &str, pattern: &str) -> BackendResult<Vec<String>> {
        let url = self.endpoint_with_query(&["data", connection], &[("pattern", pattern)])?;
        let body: KeysBody = self.get_json(url).await?;
        Ok(body.keys)
    }

    async fn get_record(&self, connection: &str, key: &str) -> BackendResult<Record> {
        let url = self.endpoint(&["data", connection, key])?;
        let body: DataBody<Record> = self.get_json(url).await?;
        Ok(body.data)
    }

    async fn create_record(
        &self,
        connection: &str,
        key: &str,
        record: &Record,
    ) -> BackendResult<()> {
        let url = self.endpoint(&["data", connection, key])?;
        self.send(self.client.post(url).json(record)).await?;
        Ok(())
    }

    async fn update_record(
        &self,
        connection: &str,
        key: &str,
        record: &Record,
    ) -> BackendResult<()> {
        let url = self.endpoint(&["data", connection, key])?;
        self.send(self.client.put(url).json(record)).await?;
        Ok(())
    }

    async fn delete_record(&self, connection: &str, key: &str) -> BackendResult<()> {
        let url = self.endpoint(&["data", connection, key])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn export_records(&self, connection: &str, pattern: &str) -> BackendResult<Value> {
        let url = self.endpoint_with_query(&["export", connection], &[("pattern", pattern)])?;
        let body: DataBody<Value> = self.get_json(url).await?;
        Ok(body.data)
    }
}

#[async_trait]
impl SearchApi for RestBackend {
    async fn search(
        &self,
        connection: &str,
        request: &SearchRequest,
    ) -> BackendResult<Vec<SearchHit>> {
        let top_k = request.top_k.to_string();
        let threshold = request.threshold.to_string();
        let search_key = request.target.targets_question().to_string();
        let url = self.endpoint_with_query(
            &["search", connection],
            &[
                ("collection_key", request.sub_collection.as_str()),
                ("query", request.query.as_str()),
                ("top_k", top_k.as_str()),
                ("threshold", threshold.as_str()),
                ("search_key", search_key.as_str()),
            ],
        )?;
        let body: ResultsBody = self.get_json(url).await?;
        Ok(body.results)
    }
}

#[async_trait]
impl ModelApi for RestBackend {
    async fn list_models(&self) -> BackendResult<Vec<ModelProfile>> {
        let url = self.endpoint(&["model", "configs"])?;
        let body: ModelConfigsBody = self.get_json(url).await?;
        Ok(body
            .configs
            .into_iter()
            .map(|(name, stored)| stored.into_profile(&name))
            .collect())
    }

    async fn save_model(&self, profile: &ModelProfile) -> BackendResult<()> {
        let url = self.endpoint(&["model", "config"])?;
        self.send(self.client.post(url).json(profile)).await?;
        Ok(())
    }

    async fn delete_model(&self, name: &str) -> BackendResult<()> {
        let url = self.endpoint(&["model", "config", "delete"])?;
        self.send(self.client.post(url).json(&json!({ "name": name })))
            .await?;
        Ok(())
    }

    async fn current_model(&self) -> BackendResult<ModelProfile> {
        let url = self.endpoint(&["model", "current"])?;
        let body: CurrentModelBody = self.get_json(url).await?;
        Ok(body.model.into_profile(""))
    }

    async fn set_current_model(&self, name: &str) -> BackendResult<()> {
        let url = self.endpoint(&["model", "current", name])?;
        self.send(self.client.post(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn backend(base: &str) -> RestBackend {
        RestBackend::with_client(Client::new(), base).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let backend = backend("http://localhost:8000");
        let url = backend.endpoint(&["data", "my conn", "faq/1?x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/data/my%20conn/faq%2F1%3Fx"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = backend("http://localhost:8000/api/");
        let url = backend.endpoint(&["model", "configs"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/model/configs");
    }

    #[test]
    fn test_query_is_encoded() {
        let backend = backend("http://localhost:8000");
        let url = backend
            .endpoint_with_query(&["data", "local"], &[("pattern", "faq:*")])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/data/local?pattern=faq%3A*");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            RestBackend::with_client(Client::new(), "not a url"),
            Err(RestBackendError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            RestBackend::with_client(Client::new(), "mailto:ops@example.com"),
            Err(RestBackendError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_stored_model_name_falls_back_to_map_key() {
        let stored: StoredModel =
            serde_json::from_str(r#"{"url":"http://m","model_type":"embedding"}"#).unwrap();
        let profile = stored.into_profile("embed");
        assert_eq!(profile.name, "embed");
        assert_eq!(profile.model_type, ModelType::Embedding);
        assert!(profile.api_key.is_none());
    }
}
