//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod backend;
mod client_state;
mod clock;
mod confirmer;
mod export_sink;

pub use backend::{BackendError, BackendResult, ConnectionApi, ModelApi, RecordApi, SearchApi};
pub use client_state::{ClientStateError, ClientStateStore};
pub use clock::Clock;
pub use confirmer::Confirmer;
pub use export_sink::{ExportError, ExportSink};
