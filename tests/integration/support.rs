//! Shared mock collaborators for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use loomflow::{
    EmbeddingProvider, EngineError, EngineResult, InvokeOptions, ModelInvoker, ModelOverrides,
    NodeOutput, SemanticHit, ToolRegistry, VectorStoreAdapter,
};

// ============================================================================
// Model invoker mocks
// ============================================================================

/// Echoes prompts back as `"echo(<model>): <prompt>"`, optionally serving
/// scripted replies keyed by a substring of the prompt. Records every
/// prompt it sees, shared across derived variants.
pub struct EchoInvoker {
    model: String,
    scripted: HashMap<String, String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl EchoInvoker {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            scripted: HashMap::new(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` whenever the prompt contains `marker`.
    pub fn with_reply(mut self, marker: &str, response: &str) -> Self {
        self.scripted.insert(marker.to_string(), response.to_string());
        self
    }
}

#[async_trait]
impl ModelInvoker for EchoInvoker {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str, _options: &InvokeOptions) -> EngineResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        for (marker, response) in &self.scripted {
            if prompt.contains(marker.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(format!("echo({}): {}", self.model, prompt))
    }

    fn with_overrides(&self, overrides: &ModelOverrides) -> Arc<dyn ModelInvoker> {
        Arc::new(EchoInvoker {
            model: overrides
                .model
                .clone()
                .unwrap_or_else(|| self.model.clone()),
            scripted: self.scripted.clone(),
            prompts: self.prompts.clone(),
        })
    }
}

/// Always fails, carrying a fixed upstream message.
pub struct FailingInvoker;

#[async_trait]
impl ModelInvoker for FailingInvoker {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing-model"
    }

    async fn invoke(&self, _prompt: &str, _options: &InvokeOptions) -> EngineResult<String> {
        Err(EngineError::model("upstream provider exploded"))
    }

    fn with_overrides(&self, _overrides: &ModelOverrides) -> Arc<dyn ModelInvoker> {
        Arc::new(FailingInvoker)
    }
}

// ============================================================================
// Embedding provider mocks
// ============================================================================

/// Embeds text as a fixed-dimension keyword indicator vector, so cosine
/// similarity behaves predictably in tests.
pub struct KeywordEmbedding {
    keywords: Vec<String>,
}

impl KeywordEmbedding {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedding {
    fn name(&self) -> &'static str {
        "keyword-embedding"
    }

    async fn embed(&self, text: &str) -> EngineResult<Vec<f32>> {
        let lowered = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| if lowered.contains(k.as_str()) { 1.0 } else { 0.0 })
            .collect())
    }
}

/// Always fails to embed.
pub struct BrokenEmbedding;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedding {
    fn name(&self) -> &'static str {
        "broken-embedding"
    }

    async fn embed(&self, _text: &str) -> EngineResult<Vec<f32>> {
        Err(EngineError::embedding("embedding service offline"))
    }
}

// ============================================================================
// Vector store mocks
// ============================================================================

/// Serves canned hits for every query; `Empty` misses; `Broken` errors.
pub enum MockVectorStore {
    Hits(Vec<SemanticHit>),
    Empty,
    Broken,
}

#[async_trait]
impl VectorStoreAdapter for MockVectorStore {
    async fn semantic_search(
        &self,
        _source: &str,
        _query_embedding: &[f32],
        top_k: usize,
    ) -> EngineResult<Vec<SemanticHit>> {
        match self {
            MockVectorStore::Hits(hits) => Ok(hits.iter().take(top_k).cloned().collect()),
            MockVectorStore::Empty => Ok(Vec::new()),
            MockVectorStore::Broken => Err(EngineError::vector_store("store unreachable")),
        }
    }
}

pub fn hit(title: &str, content: &str, score: f32) -> SemanticHit {
    SemanticHit {
        id: None,
        title: title.to_string(),
        content: content.to_string(),
        metadata: HashMap::new(),
        score,
    }
}

// ============================================================================
// Tool registry mock
// ============================================================================

/// Registry backed by a name -> output map.
pub struct MockToolRegistry {
    tools: HashMap<String, NodeOutput>,
}

impl MockToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn with_tool(mut self, name: &str, output: NodeOutput) -> Self {
        self.tools.insert(name.to_string(), output);
        self
    }
}

#[async_trait]
impl ToolRegistry for MockToolRegistry {
    fn contains(&self, tool_name: &str) -> bool {
        self.tools.contains_key(tool_name)
    }

    async fn invoke(&self, tool_name: &str, _query: &str) -> EngineResult<NodeOutput> {
        self.tools
            .get(tool_name)
            .cloned()
            .ok_or_else(|| EngineError::tool(format!("tool '{}' not found", tool_name)))
    }
}
