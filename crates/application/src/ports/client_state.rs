//! Client-local durable state port.

use async_trait::async_trait;

/// Errors raised by the client-local state store.
#[derive(Debug, thiserror::Error)]
pub enum ClientStateError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No location is available for client state.
    #[error("no client state location available")]
    NoLocation,
}

/// Durable storage for state that outlives a session.
///
/// Holds one value: the name of the last active connection.
#[async_trait]
pub trait ClientStateStore: Send + Sync {
    /// Reads the remembered connection name.
    async fn remembered_connection(&self) -> Result<Option<String>, ClientStateError>;

    /// Remembers a connection name, replacing any previous one.
    async fn remember_connection(&self, name: &str) -> Result<(), ClientStateError>;

    /// Forgets the remembered connection name.
    async fn forget_connection(&self) -> Result<(), ClientStateError>;
}
