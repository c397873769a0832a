//! Destructive-action confirmations.

/// A destructive action the operator must confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Delete a connection profile.
    DeleteConnection(String),
    /// Delete a whole record.
    DeleteRecord(String),
    /// Delete one field of the open record.
    DeleteField(String),
    /// Delete a model profile.
    DeleteModel(String),
}

impl Confirmation {
    /// Short title for the prompt.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::DeleteConnection(_) => "Delete connection",
            Self::DeleteRecord(_) => "Delete record",
            Self::DeleteField(_) => "Delete field",
            Self::DeleteModel(_) => "Delete model",
        }
    }

    /// Question shown to the operator.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::DeleteConnection(name) => format!("Delete connection \"{name}\"?"),
            Self::DeleteRecord(key) => format!("Delete {key}?"),
            Self::DeleteField(field) => format!("Delete field \"{field}\"?"),
            Self::DeleteModel(name) => format!("Delete model \"{name}\"?"),
        }
    }
}

/// Result of an operation that may be declined at a confirmation prompt.
///
/// A declined confirmation is a no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T = ()> {
    /// The operation ran.
    Done(T),
    /// The operator declined.
    Cancelled,
}

impl<T> Outcome<T> {
    /// Returns true if the operator declined.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the value if the operation ran.
    #[must_use]
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}
