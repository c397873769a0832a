//! Key listing state.
//!
//! A failed refresh clears the list, so an empty list alone does not tell
//! "no keys" apart from "unknown". This state carries the difference.

/// Status of the cached key listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyListState {
    /// No refresh has run for the current connection.
    #[default]
    Unloaded,
    /// The last refresh succeeded; the list is what the server returned.
    Loaded,
    /// The last refresh failed; the list is empty and its real content unknown.
    Failed {
        /// Reported error.
        message: String,
    },
}

impl KeyListState {
    /// Returns true if the cached list reflects a successful refresh.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Returns true if the last refresh failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true if an empty list can be trusted as "no matching keys".
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.is_loaded()
    }
}
