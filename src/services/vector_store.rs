//! Vector Store Boundary
//!
//! Adapter interface for a durable vector store. When an adapter is
//! configured and returns at least one hit for a query embedding, its
//! results are used as-is (already ranked and filtered); local scoring is
//! the fallback path on error or empty result.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::EngineResult;

/// A pre-ranked hit from the durable vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticHit {
    /// Stable entry identifier, when the store tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Matched entry title.
    pub title: String,
    /// Matched entry content.
    pub content: String,
    /// Store-specific metadata passed through to callers.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// The store's own relevance score.
    pub score: f32,
}

/// Queries a durable vector store by embedding.
#[async_trait]
pub trait VectorStoreAdapter: Send + Sync {
    /// Search a source for the nearest entries to the query embedding.
    ///
    /// Returns an empty list on a miss; errors are treated as soft
    /// degradation by the caller.
    async fn semantic_search(
        &self,
        source: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> EngineResult<Vec<SemanticHit>>;
}
