//! Vector search over the professor review index
//!
//! [`VectorSearchClient`] turns a query vector and [`SearchCriteria`] into a
//! fixed-size query against a [`VectorIndex`] and returns the ranked
//! [`MatchResult`]s in the order the index produced them.

pub mod pinecone;

pub use pinecone::PineconeIndex;

use crate::error::Result;
use crate::intent::SearchCriteria;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Number of matches requested for every query
pub const TOP_K: usize = 3;

/// One professor record returned by the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Professor identifier (the record id, usually the professor's name)
    pub id: String,
    /// Subject taught
    pub subject: String,
    /// Star rating
    pub stars: f64,
    /// Review text
    pub review: String,
}

/// Query sent to a vector index
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Query embedding
    pub vector: Vec<f32>,
    /// Number of results to return
    pub top_k: usize,
    /// Whether record metadata is returned with each match
    pub include_metadata: bool,
    /// Metadata filter, `None` for an unfiltered query
    pub filter: Option<Value>,
}

/// Similarity search backend
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Runs a query and returns matches ranked by descending similarity
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Search` when the index cannot be queried
    async fn query(&self, request: &QueryRequest) -> Result<Vec<MatchResult>>;
}

/// Criteria-aware search client
#[derive(Clone)]
pub struct VectorSearchClient {
    index: Arc<dyn VectorIndex>,
}

impl VectorSearchClient {
    /// Create a client over the given index
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    /// Finds the top matches for a query vector
    ///
    /// Always asks for [`TOP_K`] results with metadata. Non-empty criteria
    /// become an exact-match filter; empty criteria run unfiltered. An empty
    /// result is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns error if the index query fails
    pub async fn search(
        &self,
        vector: Vec<f32>,
        criteria: &SearchCriteria,
    ) -> Result<Vec<MatchResult>> {
        let request = QueryRequest {
            vector,
            top_k: TOP_K,
            include_metadata: true,
            filter: criteria.to_filter(),
        };

        tracing::debug!(
            top_k = request.top_k,
            filtered = request.filter.is_some(),
            "Querying vector index"
        );

        let matches = self.index.query(&request).await?;
        tracing::debug!(matches = matches.len(), "Vector index returned matches");
        Ok(matches)
    }
}

impl std::fmt::Debug for VectorSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearchClient").finish_non_exhaustive()
    }
}
