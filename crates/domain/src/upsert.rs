//! Create-or-update resolution.
//!
//! The backend has separate create and update verbs and no upsert, so a
//! write is preceded by an existence check:
//!
//! ```text
//! Unknown --read ok--------> Exists --update--> Written(Updated)
//!         --read not found-> Absent --create--> Written(Created)
//! ```
//!
//! Any other read outcome aborts before a write. The window between the
//! check and the write is not protected: a concurrent writer can create or
//! delete the key in between.

/// The write that resolved an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// The key did not exist and was created.
    Created,
    /// The key existed and was replaced.
    Updated,
}

impl std::fmt::Display for WriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
        }
    }
}

/// Progress of one upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpsertState {
    /// Existence not checked yet.
    #[default]
    Unknown,
    /// The read found the key.
    Exists,
    /// The read reported the key as not found.
    Absent,
    /// The write succeeded.
    Written(WriteKind),
}

impl UpsertState {
    /// Records the existence check. Only valid from `Unknown`.
    #[must_use]
    pub const fn observe(self, found: bool) -> Self {
        match self {
            Self::Unknown if found => Self::Exists,
            Self::Unknown => Self::Absent,
            other => other,
        }
    }

    /// The write this state calls for, if any.
    #[must_use]
    pub const fn write_kind(self) -> Option<WriteKind> {
        match self {
            Self::Exists => Some(WriteKind::Updated),
            Self::Absent => Some(WriteKind::Created),
            Self::Unknown | Self::Written(_) => None,
        }
    }

    /// Records a successful write.
    #[must_use]
    pub const fn complete(self) -> Self {
        match self.write_kind() {
            Some(kind) => Self::Written(kind),
            None => self,
        }
    }

    /// The write that finished the upsert, once it is `Written`.
    #[must_use]
    pub const fn written(self) -> Option<WriteKind> {
        match self {
            Self::Written(kind) => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_key_resolves_to_update() {
        let state = UpsertState::Unknown.observe(true);
        assert_eq!(state, UpsertState::Exists);
        assert_eq!(state.write_kind(), Some(WriteKind::Updated));
        assert_eq!(state.complete(), UpsertState::Written(WriteKind::Updated));
        assert_eq!(state.complete().written(), Some(WriteKind::Updated));
    }

    #[test]
    fn test_missing_key_resolves_to_create() {
        let state = UpsertState::Unknown.observe(false);
        assert_eq!(state.write_kind(), Some(WriteKind::Created));
        assert_eq!(state.complete(), UpsertState::Written(WriteKind::Created));
    }

    #[test]
    fn test_unknown_has_no_write() {
        assert_eq!(UpsertState::Unknown.write_kind(), None);
        assert_eq!(UpsertState::Unknown.complete(), UpsertState::Unknown);
        assert_eq!(UpsertState::Exists.written(), None);
    }

    #[test]
    fn test_observe_only_from_unknown() {
        let written = UpsertState::Written(WriteKind::Created);
        assert_eq!(written.observe(true), written);
        assert_eq!(UpsertState::Absent.observe(true), UpsertState::Absent);
    }
}
