//! Keydesk Domain - Core types
//!
//! This crate defines the domain model for the Keydesk client.
//! All types here are pure Rust with no I/O dependencies.

pub mod confirmation;
pub mod connection;
pub mod error;
pub mod export;
pub mod model;
pub mod record;
pub mod search;
pub mod settings;
pub mod state;
pub mod upsert;

pub use confirmation::{Confirmation, Outcome};
pub use connection::{ConnectionProfile, DEFAULT_PORT, KeyEntry, startup_selection};
pub use error::{DomainError, DomainResult};
pub use export::ExportArtifact;
pub use model::{EditMode, MASKED_SECRET, ModelDraft, ModelProfile, ModelType};
pub use record::{
    FieldEntry, PendingEdit, Record, RecordDraft, RecordSource, parse_field_value,
    render_field_value,
};
pub use search::{DEFAULT_THRESHOLD, DEFAULT_TOP_K, SearchHit, SearchRequest, SearchTarget};
pub use settings::ClientSettings;
pub use state::KeyListState;
pub use upsert::{UpsertState, WriteKind};
