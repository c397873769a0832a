//! Search session

use std::sync::Arc;

use keydesk_domain::{SearchHit, SearchRequest, SearchTarget};

use crate::error::{ApplicationResult, remote};
use crate::ports::SearchApi;

/// The current search form and its last results.
pub struct SearchSession<A> {
    api: Arc<A>,
    request: SearchRequest,
    results: Vec<SearchHit>,
}

impl<A: SearchApi> SearchSession<A> {
    /// Creates a session with default tuning and no results.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            request: SearchRequest::default(),
            results: Vec::new(),
        }
    }

    /// The current request.
    #[must_use]
    pub const fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Results of the last successful search.
    #[must_use]
    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    /// Switches to another sub-collection. Results are cleared immediately.
    pub fn change_sub_collection(&mut self, name: impl Into<String>) {
        self.request.sub_collection = name.into();
        self.results.clear();
    }

    /// Sets the query text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.request.query = query.into();
    }

    /// Sets the maximum number of matches.
    pub const fn set_top_k(&mut self, top_k: u32) {
        self.request.top_k = top_k;
    }

    /// Sets the minimum similarity.
    pub const fn set_threshold(&mut self, threshold: f64) {
        self.request.threshold = threshold;
    }

    /// Sets which side of each pair is matched.
    pub const fn set_target(&mut self, target: SearchTarget) {
        self.request.target = target;
    }

    /// Clears results and the sub-collection, e.g. when the connection changes.
    pub fn reset(&mut self) {
        self.request.sub_collection.clear();
        self.results.clear();
    }

    /// Runs `request` against the active connection.
    ///
    /// The request becomes the current one. Results are replaced wholesale on
    /// success; a failed call keeps the previous results unless the
    /// sub-collection changed.
    ///
    /// # Errors
    /// Returns a validation error if the sub-collection or query is blank
    /// (no call is made), or [`crate::ApplicationError::Remote`].
    pub async fn run_search(
        &mut self,
        connection: &str,
        request: SearchRequest,
    ) -> ApplicationResult<&[SearchHit]> {
        if request.sub_collection != self.request.sub_collection {
            self.results.clear();
        }
        self.request = request;
        self.request.validate()?;

        let hits = self
            .api
            .search(connection, &self.request)
            .await
            .map_err(remote("search"))?;
        tracing::debug!(
            connection,
            sub_collection = %self.request.sub_collection,
            hits = hits.len(),
            "search finished"
        );
        self.results = hits;
        Ok(&self.results)
    }

    /// Runs the current request again.
    ///
    /// # Errors
    /// Same as [`Self::run_search`].
    pub async fn rerun(&mut self, connection: &str) -> ApplicationResult<&[SearchHit]> {
        let request = self.request.clone();
        self.run_search(connection, request).await
    }
}
