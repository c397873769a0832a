//! Port adapters

mod rest_backend;
mod system_clock;

pub use rest_backend::{RestBackend, RestBackendError};
pub use system_clock::SystemClock;
