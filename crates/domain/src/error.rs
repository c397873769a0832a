//! Domain error types

use thiserror::Error;

/// Validation errors raised before any remote call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A profile name is empty or whitespace.
    #[error("name must not be empty")]
    EmptyName,

    /// A record key is empty or whitespace.
    #[error("record key must not be empty")]
    EmptyKey,

    /// The submitted record has no fields.
    #[error("record data must not be empty")]
    EmptyRecord,

    /// Import mode was chosen but nothing was imported.
    #[error("no data imported")]
    NothingImported,

    /// The imported document is not valid JSON.
    #[error("invalid JSON document: {0}")]
    InvalidImport(String),

    /// The imported document is valid JSON but not an object.
    #[error("imported document must be a JSON object")]
    ImportNotAnObject,

    /// A field name is empty or whitespace.
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// The field does not exist in the open record.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A search was requested without a sub-collection.
    #[error("select a sub-collection to search")]
    MissingSubCollection,

    /// A search was requested without query text.
    #[error("enter a query to search")]
    EmptyQuery,
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Returns `Err(error)` when `value` is empty after trimming.
pub(crate) fn require_non_blank(value: &str, error: DomainError) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}
