//! Knowledge Data Model
//!
//! Knowledge-base entries as supplied by the configuration, their indexed
//! form (token set + optional embedding), and the scored matches produced
//! by retrieval.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A raw knowledge-base entry from the configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Optional stable identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Entry title.
    pub title: String,
    /// Entry body text.
    pub content: String,
    /// Optional short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Classification tags. Each tag adds a small lexical score bonus.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Additional lookup keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Explicit ranking priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>,
    /// Legacy ranking weight, used when `priority` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl KnowledgeEntry {
    /// Ranking priority: `priority`, falling back to `weight`, then 1.0.
    pub fn effective_priority(&self) -> f32 {
        self.priority.or(self.weight).unwrap_or(1.0)
    }

    /// The text embedded for this entry: title, summary, content, tags and
    /// keywords joined by newlines, skipping absent fields.
    pub fn embed_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.title.as_str()];
        if let Some(summary) = &self.summary {
            parts.push(summary);
        }
        parts.push(&self.content);
        parts.extend(self.tags.iter().map(String::as_str));
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.join("\n")
    }
}

/// A knowledge entry after indexing: the original fields plus the derived
/// token set and, when an embedding provider is configured, its vector.
///
/// Built once per configuration load and shared read-only across runs.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    /// The original entry.
    pub entry: KnowledgeEntry,
    /// Deduplicated lowercase tokens from title, summary, content, tags,
    /// and keywords.
    pub tokens: HashSet<String>,
    /// Embedding vector, absent when no provider is configured or the
    /// provider failed for this entry.
    pub embedding: Option<Vec<f32>>,
}

/// A ranked retrieval match. Produced per retrieval call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// 1-based rank within the result list.
    pub rank: usize,
    /// The matched entry's id, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The matched entry's title.
    pub title: String,
    /// The matched entry's content.
    pub content: String,
    /// The matched entry's summary, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// The matched entry's tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The matched entry's keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Relevance score. Zero for fallback matches.
    pub score: f32,
}

impl ScoredMatch {
    /// Build a match from an indexed entry at the given rank.
    pub fn from_entry(rank: usize, entry: &IndexedEntry, score: f32) -> Self {
        Self {
            rank,
            id: entry.entry.id.clone(),
            title: entry.entry.title.clone(),
            content: entry.entry.content.clone(),
            summary: entry.entry.summary.clone(),
            tags: entry.entry.tags.clone(),
            keywords: entry.entry.keywords.clone(),
            score,
        }
    }
}
