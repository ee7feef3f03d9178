//! Tokenizer
//!
//! Normalizes free text into lowercase alphanumeric tokens. Used by both
//! knowledge indexing and query scoring so the two sides always agree on
//! token boundaries.

use std::collections::HashSet;

/// Split text into lowercase alphanumeric tokens, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// Split text into a deduplicated set of lowercase alphanumeric tokens.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}
