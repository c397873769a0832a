//! Stateful client components
//!
//! Each component owns its state and changes it only through its own
//! operations. Backend access goes through the ports.

mod connection_registry;
mod crud;
mod model_registry;
mod record_cache;
mod search_session;

pub use connection_registry::ConnectionRegistry;
pub use crud::{CrudOrchestrator, NEW_FIELD_PREFIX};
pub use model_registry::ModelRegistry;
pub use record_cache::{DEFAULT_PATTERN, OpenRecord, RecordCache};
pub use search_session::SearchSession;
