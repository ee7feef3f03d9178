//! Knowledge Base Indexer
//!
//! Turns raw configuration entries into indexed entries: a deduplicated
//! lowercase token set plus, when an embedding provider is configured, an
//! embedding vector per entry.
//!
//! Rebuilding the index (a configuration reload) produces a fresh
//! [`KnowledgeIndex`] snapshot that replaces the old one atomically —
//! partial updates are not supported, entries absent from the new
//! configuration vanish from subsequent retrieval.
//!
//! ## Embedding cache
//!
//! Embeddings are cached at the content level, keyed by the SHA-256 hash of
//! the embedded text, so a reload only re-embeds entries whose text
//! actually changed.

use std::collections::HashMap;
use std::sync::Arc;

use mini_moka::sync::Cache;
use sha2::{Digest, Sha256};

use crate::models::knowledge::{IndexedEntry, KnowledgeEntry};
use crate::services::embedding::EmbeddingProvider;
use crate::services::knowledge::tokenizer::token_set;

/// Maximum number of cached embeddings.
const EMBED_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Immutable snapshot of all indexed knowledge sources.
///
/// Shared read-only across concurrent runs.
#[derive(Debug, Default)]
pub struct KnowledgeIndex {
    sources: HashMap<String, Vec<IndexedEntry>>,
}

impl KnowledgeIndex {
    /// Entries for a source, `None` when the source is not indexed.
    pub fn source(&self, name: &str) -> Option<&[IndexedEntry]> {
        self.sources.get(name).map(Vec::as_slice)
    }

    /// Names of all indexed sources.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Total number of indexed entries across all sources.
    pub fn entry_count(&self) -> usize {
        self.sources.values().map(Vec::len).sum()
    }
}

/// Builds [`KnowledgeIndex`] snapshots from configuration entries.
pub struct KnowledgeIndexer {
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    embed_cache: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl KnowledgeIndexer {
    /// Create an indexer. With no provider, entries are indexed
    /// lexical-only.
    pub fn new(embeddings: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self {
            embeddings,
            embed_cache: Cache::new(EMBED_CACHE_MAX_ENTRIES),
        }
    }

    /// Index every source in the mapping.
    ///
    /// A per-entry embedding failure is logged and leaves that entry
    /// without an embedding; it never aborts the rest of the batch.
    pub async fn build_index(
        &self,
        sources: &HashMap<String, Vec<KnowledgeEntry>>,
    ) -> KnowledgeIndex {
        let mut indexed: HashMap<String, Vec<IndexedEntry>> = HashMap::new();

        for (name, entries) in sources {
            let mut list = Vec::with_capacity(entries.len());
            for entry in entries {
                list.push(self.index_entry(name, entry).await);
            }
            tracing::debug!(source = %name, entries = list.len(), "indexed knowledge source");
            indexed.insert(name.clone(), list);
        }

        KnowledgeIndex { sources: indexed }
    }

    async fn index_entry(&self, source: &str, entry: &KnowledgeEntry) -> IndexedEntry {
        let text = entry.embed_text();
        let tokens = token_set(&text);
        let embedding = self.embed(source, entry, &text).await;

        IndexedEntry {
            entry: entry.clone(),
            tokens,
            embedding,
        }
    }

    async fn embed(&self, source: &str, entry: &KnowledgeEntry, text: &str) -> Option<Vec<f32>> {
        let provider = self.embeddings.as_ref()?;

        let key = cache_key(text);
        if let Some(cached) = self.embed_cache.get(&key) {
            return Some(cached.as_ref().clone());
        }

        match provider.embed(text).await {
            Ok(vector) => {
                self.embed_cache.insert(key, Arc::new(vector.clone()));
                Some(vector)
            }
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    title = %entry.title,
                    error = %e,
                    "embedding failed for knowledge entry, continuing lexical-only"
                );
                None
            }
        }
    }
}

fn cache_key(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}
