//! Template Interpolator
//!
//! Resolves `{token}`-style placeholders against the run state. Prompt
//! construction is total: no token can fail interpolation, unresolved
//! tokens become empty strings and prompt-quality issues are deferred to
//! the model rather than the engine.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::run::PipelineState;

/// Matches `{token}` placeholders. Compiled once.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_-]+)\}").expect("valid token pattern"))
}

/// Replace every `{token}` occurrence in the template.
///
/// Reserved tokens (case-insensitive) resolve to state fields: `input`,
/// `context`, `intent`, `last_output`. Any other token resolves through
/// the variable map by exact key, then lowercased key; unknown tokens
/// resolve to the empty string.
pub fn interpolate(template: &str, state: &PipelineState) -> String {
    token_pattern()
        .replace_all(template, |caps: &Captures| resolve(&caps[1], state))
        .into_owned()
}

fn resolve(token: &str, state: &PipelineState) -> String {
    match token.to_lowercase().as_str() {
        "input" => state.input.clone(),
        "context" => state.context.clone(),
        "intent" => state.intent.clone(),
        "last_output" => state.last_output.clone(),
        _ => state
            .variable(token)
            .map(|output| output.render())
            .unwrap_or_default(),
    }
}
