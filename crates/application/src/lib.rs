//! Keydesk Application - Client components and ports
//!
//! This crate holds the stateful client components (connection registry,
//! record cache, CRUD orchestrator, search session, model registry) and the
//! ports they use to reach the backend and local collaborators.

pub mod components;
mod error;
pub mod ports;
pub mod session;

#[cfg(test)]
mod testing;

pub use components::{
    ConnectionRegistry, CrudOrchestrator, DEFAULT_PATTERN, ModelRegistry, NEW_FIELD_PREFIX,
    OpenRecord, RecordCache, SearchSession,
};
pub use error::{ApplicationError, ApplicationResult};
pub use session::Session;
