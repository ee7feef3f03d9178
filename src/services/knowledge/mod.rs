//! Knowledge System
//!
//! Hybrid knowledge retrieval components:
//! - `tokenizer`: lowercase alphanumeric tokenization
//! - `indexer`: knowledge-base indexing (tokens + optional embeddings)
//! - `scorer`: lexical/semantic blended ranking

pub mod indexer;
pub mod scorer;
pub mod tokenizer;

pub use indexer::{KnowledgeIndex, KnowledgeIndexer};
