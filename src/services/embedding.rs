//! Embedding Provider Boundary
//!
//! Defines the async `EmbeddingProvider` trait for pluggable embedding
//! backends. The engine never constructs providers itself; one is injected
//! and treated as opaque. Every call site catches failures and degrades to
//! lexical-only scoring, so a broken provider can never abort indexing or
//! a run.

use async_trait::async_trait;

use crate::utils::error::EngineResult;

/// Produces embedding vectors for free text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Embed a single text into a vector.
    async fn embed(&self, text: &str) -> EngineResult<Vec<f32>>;
}
