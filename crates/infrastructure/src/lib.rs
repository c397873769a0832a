//! Keydesk Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod export;
pub mod persistence;
pub mod serialization;

pub use adapters::{RestBackend, RestBackendError, SystemClock};
pub use export::FileExportSink;
pub use persistence::{
    ENV_API_URL, ENV_TIMEOUT_SECS, FileClientStateStore, SettingsError, SettingsRepository,
    apply_env_overrides,
};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
