//! Run State and Trace Model
//!
//! Per-run mutable state threaded across node executions, the tagged node
//! output value, and the step trace returned to callers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::pipeline::NodeType;

/// Output produced by a single node.
///
/// A closed tagged value rather than an open "anything" bag: nodes produce
/// either plain text (LLM output, plain tool replies) or a structured
/// object (retrieval results, structured tool replies).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NodeOutput {
    /// Plain text output.
    Text(String),
    /// Structured JSON output.
    Structured(Value),
}

impl NodeOutput {
    /// Render the output as a string: text passes through, structured
    /// values serialize to compact JSON.
    pub fn render(&self) -> String {
        match self {
            NodeOutput::Text(text) => text.clone(),
            NodeOutput::Structured(value) => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

/// Mutable state threaded through a single pipeline run.
///
/// Created fresh at the start of each run, owned exclusively by it, and
/// mutated only by the executor in schedule order. Discarded after the run;
/// the final `last_output`/`context`/`intent` are copied into the result.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// The user request that started the run.
    pub input: String,
    /// Accumulated context visible to later nodes.
    pub context: String,
    /// Detected intent, when an intent node has run.
    pub intent: String,
    /// Rendered output of the most recent node.
    pub last_output: String,
    /// Per-node outputs keyed by node id, with a lowercased alias for
    /// case-insensitive template lookup.
    variables: HashMap<String, NodeOutput>,
}

impl PipelineState {
    /// Create the initial state for a run.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Record a node's output under its id and the lowercased id.
    pub fn set_variable(&mut self, node_id: &str, output: NodeOutput) {
        let lowered = node_id.to_lowercase();
        if lowered != node_id {
            self.variables.insert(lowered, output.clone());
        }
        self.variables.insert(node_id.to_string(), output);
    }

    /// Look up a variable by exact key, then by lowercased key.
    pub fn variable(&self, key: &str) -> Option<&NodeOutput> {
        self.variables
            .get(key)
            .or_else(|| self.variables.get(&key.to_lowercase()))
    }

    /// The query string retrieval and tool nodes operate on: the original
    /// input plus the detected intent.
    pub fn query(&self) -> String {
        let mut query = self.input.trim().to_string();
        let intent = self.intent.trim();
        if !intent.is_empty() {
            if !query.is_empty() {
                query.push(' ');
            }
            query.push_str(intent);
        }
        query
    }
}

/// Metadata recorded with each step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepMetadata {
    /// Model that produced an LLM step's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature override in effect for an LLM step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// One executed node in the run trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Id of the executed node.
    pub node_id: String,
    /// Node type that was dispatched.
    pub node_type: NodeType,
    /// The node's output.
    pub output: NodeOutput,
    /// Step metadata (model/temperature for LLM steps).
    #[serde(default)]
    pub metadata: StepMetadata,
    /// Wall-clock duration of the step in milliseconds.
    pub duration_ms: u64,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunResult {
    /// Unique run identifier.
    pub run_id: String,
    /// Name of the executed pipeline.
    pub pipeline: String,
    /// Rendered output of the final node.
    pub final_output: String,
    /// Detected intent, empty when no intent node ran.
    pub intent: String,
    /// Final accumulated context.
    pub context: String,
    /// Ordered trace of executed steps.
    pub steps: Vec<StepRecord>,
    /// Soft-degrade warnings recorded during the run.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// ISO 8601 timestamp when the run started.
    pub started_at: String,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
}
