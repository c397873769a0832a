//! Semantic search request and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult, require_non_blank};

/// Default maximum number of matches.
pub const DEFAULT_TOP_K: u32 = 5;

/// Default minimum similarity score.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Which side of each indexed question/answer pair a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    /// Match against field names (the question side).
    #[default]
    Question,
    /// Match against field values (the answer side).
    Answer,
}

impl SearchTarget {
    /// The boolean flag the backend expects: `true` targets questions.
    #[must_use]
    pub const fn targets_question(self) -> bool {
        matches!(self, Self::Question)
    }
}

/// A semantic query over one sub-collection of the active connection.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Key of the record holding the indexed pairs.
    pub sub_collection: String,
    /// Free-text query.
    pub query: String,
    /// Maximum number of matches.
    pub top_k: u32,
    /// Minimum similarity score.
    pub threshold: f64,
    /// Side of each pair to match against.
    pub target: SearchTarget,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            sub_collection: String::new(),
            query: String::new(),
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
            target: SearchTarget::default(),
        }
    }
}

impl SearchRequest {
    /// Creates a request with default tuning.
    #[must_use]
    pub fn new(sub_collection: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            sub_collection: sub_collection.into(),
            query: query.into(),
            ..Self::default()
        }
    }

    /// Checks that both the sub-collection and the query are present.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingSubCollection`] or
    /// [`DomainError::EmptyQuery`].
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank(&self.sub_collection, DomainError::MissingSubCollection)?;
        require_non_blank(&self.query, DomainError::EmptyQuery)
    }
}

/// One scored match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Field name of the matched pair.
    pub key: String,
    /// Value of the matched pair.
    pub data: Value,
    /// Similarity score.
    pub similarity: f64,
}
