//! Pipeline Data Model
//!
//! Declarative pipeline definitions: named node graphs with optional
//! ordering edges. Definitions are immutable once loaded and replaced
//! wholesale on configuration reload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::{EngineError, EngineResult};

/// Default result count for retriever nodes.
fn default_top_k() -> usize {
    3
}

/// A named workflow of nodes executed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name, unique within a loaded configuration.
    /// Lookup is case-insensitive.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered list of nodes. Declaration order is the scheduling tie-break.
    pub nodes: Vec<PipelineNode>,
    /// Optional ordering constraints between nodes.
    #[serde(default)]
    pub edges: Vec<PipelineEdge>,
}

impl PipelineDefinition {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&PipelineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A single step of a pipeline.
///
/// The `type`/`config` pair stays raw in the document model and is resolved
/// into a [`NodeKind`] at dispatch time via [`PipelineNode::kind`], so a
/// malformed node rejects the run it participates in rather than the whole
/// configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineNode {
    /// Node id, unique within its pipeline.
    pub id: String,
    /// Node type discriminator: "llm", "retriever", or "tool".
    #[serde(rename = "type")]
    pub node_type: String,
    /// Type-specific configuration object.
    #[serde(default)]
    pub config: Value,
}

impl PipelineNode {
    /// Resolve this node's raw type/config pair into a typed [`NodeKind`].
    ///
    /// An unsupported type or a config missing required fields yields an
    /// invalid-configuration error naming this node.
    pub fn kind(&self) -> EngineResult<NodeKind> {
        let config = if self.config.is_null() {
            Value::Object(Default::default())
        } else {
            self.config.clone()
        };

        match self.node_type.as_str() {
            "llm" => serde_json::from_value(config).map(NodeKind::Llm),
            "retriever" => serde_json::from_value(config).map(NodeKind::Retriever),
            "tool" => serde_json::from_value(config).map(NodeKind::Tool),
            other => {
                return Err(EngineError::invalid_config(format!(
                    "unsupported node type '{}' for node '{}'",
                    other, self.id
                )))
            }
        }
        .map_err(|e| {
            EngineError::invalid_config(format!("node '{}' ({}): {}", self.id, self.node_type, e))
        })
    }
}

/// An ordering constraint between two nodes.
///
/// References to undeclared ids are tolerated: the scheduler tracks them as
/// extra graph vertices and the executor skips them with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEdge {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
}

/// Resolved, typed view of a node's configuration.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// LLM generation step.
    Llm(LlmNodeConfig),
    /// Knowledge retrieval step.
    Retriever(RetrieverNodeConfig),
    /// External tool invocation step.
    Tool(ToolNodeConfig),
}

impl NodeKind {
    /// The node type this kind dispatches as.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Llm(_) => NodeType::Llm,
            NodeKind::Retriever(_) => NodeType::Retriever,
            NodeKind::Tool(_) => NodeType::Tool,
        }
    }
}

/// Node type discriminator used in step traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Llm,
    Retriever,
    Tool,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Llm => write!(f, "llm"),
            NodeType::Retriever => write!(f, "retriever"),
            NodeType::Tool => write!(f, "tool"),
        }
    }
}

/// Configuration for an LLM node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LlmNodeConfig {
    /// Prompt template interpolated against the run state.
    /// Defaults to `"{input}"` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Optional model override for this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Optional temperature override for this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Optional cap on generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl LlmNodeConfig {
    /// The prompt template, falling back to the pass-through default.
    pub fn prompt_template(&self) -> &str {
        self.prompt.as_deref().unwrap_or("{input}")
    }
}

/// Configuration for a retriever node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverNodeConfig {
    /// Knowledge base source to query. Required.
    pub source: String,
    /// Maximum number of matches to return.
    #[serde(default = "default_top_k", alias = "topK")]
    pub top_k: usize,
}

/// Configuration for a tool node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolNodeConfig {
    /// Registered tool to invoke. Required.
    pub tool_name: String,
}
