//! Retrieval Scorer
//!
//! Ranks indexed knowledge entries against a query using a blend of
//! token-overlap scoring and embedding cosine similarity.
//!
//! ## Lexical score
//!
//! ```text
//! (overlap + 0.1 * tag_count) * priority / (ln(token_count + 1) + 1)
//! ```
//!
//! where `overlap` is the number of query tokens present in the entry's
//! token set and the denominator is a length-normalization penalty
//! favoring concise entries. Zero overlap scores exactly zero.
//!
//! ## Blended score
//!
//! When both the query and the entry carry embeddings of equal dimension:
//!
//! ```text
//! cosine(query, entry) * priority + lexical * 0.25
//! ```
//!
//! Otherwise the lexical score alone is used, so retrieval degrades
//! gracefully when embeddings are unavailable.

use std::collections::HashSet;

use crate::models::knowledge::{IndexedEntry, ScoredMatch};

/// Weight of each tag in the lexical score.
const TAG_BONUS: f32 = 0.1;

/// Weight of the lexical score inside the blended score.
const LEXICAL_BLEND_WEIGHT: f32 = 0.25;

/// Token-overlap relevance of an entry for the given query tokens.
///
/// Returns exactly 0.0 when no query token appears in the entry, which
/// also covers the empty query.
pub fn lexical_score(query_tokens: &HashSet<String>, entry: &IndexedEntry) -> f32 {
    let overlap = query_tokens
        .iter()
        .filter(|token| entry.tokens.contains(*token))
        .count();
    if overlap == 0 {
        return 0.0;
    }

    let tag_count = entry.entry.tags.len() as f32;
    let priority = entry.entry.effective_priority();
    let token_count = entry.tokens.len() as f32;

    (overlap as f32 + TAG_BONUS * tag_count) * priority / ((token_count + 1.0).ln() + 1.0)
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 on dimension mismatch, empty vectors, or zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Score a single entry against the query.
///
/// Blends in cosine similarity only when the query and entry embeddings
/// are both present with the same nonzero dimension.
pub fn score_entry(
    query_tokens: &HashSet<String>,
    entry: &IndexedEntry,
    query_embedding: Option<&[f32]>,
) -> f32 {
    let lexical = lexical_score(query_tokens, entry);

    match (query_embedding, entry.embedding.as_deref()) {
        (Some(query), Some(embedding)) if query.len() == embedding.len() && !query.is_empty() => {
            let similarity = cosine_similarity(query, embedding);
            similarity * entry.entry.effective_priority() + lexical * LEXICAL_BLEND_WEIGHT
        }
        _ => lexical,
    }
}

/// Rank entries against the query, returning at most `top_k` matches.
///
/// Zero-score entries are dropped when the query is non-empty. Ties keep
/// the entries' original relative order (stable sort). When nothing
/// survives but the knowledge base is non-empty, the first
/// `min(top_k, N)` entries are returned with score 0 so retrieval never
/// comes back empty purely due to lexical mismatch.
pub fn rank(
    query_tokens: &HashSet<String>,
    entries: &[IndexedEntry],
    query_embedding: Option<&[f32]>,
    top_k: usize,
) -> Vec<ScoredMatch> {
    let query_is_empty = query_tokens.is_empty();

    let mut scored: Vec<(usize, f32)> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| (i, score_entry(query_tokens, entry, query_embedding)))
        .filter(|(_, score)| query_is_empty || *score > 0.0)
        .collect();

    if scored.is_empty() {
        // No-match fallback: hand back the head of the knowledge base.
        return entries
            .iter()
            .take(top_k)
            .enumerate()
            .map(|(i, entry)| ScoredMatch::from_entry(i + 1, entry, 0.0))
            .collect();
    }

    // Stable sort: equal scores keep original declaration order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);

    scored
        .into_iter()
        .enumerate()
        .map(|(rank, (i, score))| ScoredMatch::from_entry(rank + 1, &entries[i], score))
        .collect()
}
