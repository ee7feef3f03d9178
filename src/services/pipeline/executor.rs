//! Pipeline Executor
//!
//! Walks the scheduler's order, dispatches each node to its type-specific
//! executor, threads the mutable per-run state, and records a step trace.
//!
//! A run either completes with a full trace or aborts with a single
//! descriptive error; partial traces from aborted runs are not returned.
//! Model failures propagate unretried. Soft degrades (dangling edges,
//! embedding failures, vector-store misses) are logged, recorded on the
//! result, and never abort the run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::models::knowledge::{IndexedEntry, ScoredMatch};
use crate::models::pipeline::{
    LlmNodeConfig, NodeKind, PipelineDefinition, PipelineNode, RetrieverNodeConfig, ToolNodeConfig,
};
use crate::models::run::{NodeOutput, PipelineRunResult, PipelineState, StepMetadata, StepRecord};
use crate::services::embedding::EmbeddingProvider;
use crate::services::knowledge::{scorer, tokenizer, KnowledgeIndex};
use crate::services::llm::{InvokeOptions, ModelOverrides, ModelVariantCache};
use crate::services::pipeline::interpolate::interpolate;
use crate::services::pipeline::scheduler;
use crate::services::tools::ToolRegistry;
use crate::services::vector_store::VectorStoreAdapter;
use crate::utils::error::{EngineError, EngineResult};

/// Output object of a retriever node.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalOutput {
    /// The queried knowledge source.
    pub source: String,
    /// Ranked matches.
    pub matches: Vec<ScoredMatch>,
    /// Formatted context block built from the matches.
    pub context: String,
}

/// Executes pipeline runs against a fixed snapshot of collaborators.
///
/// One executor is built per run from the engine's current snapshot; the
/// knowledge index and pipeline definition it holds are immutable shared
/// data, so concurrent runs never observe a half-reloaded configuration.
pub struct PipelineExecutor {
    models: Arc<ModelVariantCache>,
    knowledge: Arc<KnowledgeIndex>,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStoreAdapter>>,
    tools: Option<Arc<dyn ToolRegistry>>,
}

impl PipelineExecutor {
    /// Create an executor over the given collaborators.
    pub fn new(
        models: Arc<ModelVariantCache>,
        knowledge: Arc<KnowledgeIndex>,
        embeddings: Option<Arc<dyn EmbeddingProvider>>,
        vector_store: Option<Arc<dyn VectorStoreAdapter>>,
        tools: Option<Arc<dyn ToolRegistry>>,
    ) -> Self {
        Self {
            models,
            knowledge,
            embeddings,
            vector_store,
            tools,
        }
    }

    /// Run a pipeline against the user input.
    pub async fn run(
        &self,
        pipeline: &PipelineDefinition,
        input: &str,
    ) -> EngineResult<PipelineRunResult> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now().to_rfc3339();
        let started = Instant::now();

        let schedule = scheduler::schedule(pipeline);
        let mut warnings = schedule.warnings.clone();
        for warning in &schedule.warnings {
            tracing::warn!(run_id = %run_id, "{}", warning);
        }

        let mut state = PipelineState::new(input);
        let mut steps: Vec<StepRecord> = Vec::with_capacity(schedule.order.len());

        for node_id in &schedule.order {
            let Some(node) = pipeline.node(node_id) else {
                let warning = format!(
                    "edge references node '{}' which is not declared in pipeline '{}'; skipping",
                    node_id, pipeline.name
                );
                tracing::warn!(run_id = %run_id, "{}", warning);
                warnings.push(warning);
                continue;
            };

            let kind = node.kind()?;
            let step_started = Instant::now();
            let (output, metadata) = match &kind {
                NodeKind::Llm(config) => self.run_llm_node(node, config, &mut state).await?,
                NodeKind::Retriever(config) => {
                    self.run_retriever_node(node, config, &mut state, &mut warnings)
                        .await?
                }
                NodeKind::Tool(config) => self.run_tool_node(node, config, &mut state).await?,
            };

            state.last_output = output.render();
            state.set_variable(&node.id, output.clone());

            steps.push(StepRecord {
                node_id: node.id.clone(),
                node_type: kind.node_type(),
                output,
                metadata,
                duration_ms: step_started.elapsed().as_millis() as u64,
            });
        }

        tracing::debug!(
            run_id = %run_id,
            pipeline = %pipeline.name,
            steps = steps.len(),
            "pipeline run completed"
        );

        Ok(PipelineRunResult {
            run_id,
            pipeline: pipeline.name.clone(),
            final_output: state.last_output.clone(),
            intent: state.intent.clone(),
            context: state.context.clone(),
            steps,
            warnings,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn run_llm_node(
        &self,
        node: &PipelineNode,
        config: &LlmNodeConfig,
        state: &mut PipelineState,
    ) -> EngineResult<(NodeOutput, StepMetadata)> {
        let prompt = interpolate(config.prompt_template(), state);
        let invoker = self.models.resolve(&ModelOverrides {
            model: config.model.clone(),
            temperature: config.temperature,
        });
        let options = InvokeOptions {
            max_output_tokens: config.max_output_tokens,
        };

        let text = invoker.invoke(&prompt, &options).await?;

        // Naming convention carried over from the configuration contract:
        // a node whose id contains "intent" publishes its output as the
        // run's detected intent.
        if node.id.to_lowercase().contains("intent") {
            state.intent = text.trim().to_string();
        }
        if state.context.is_empty() {
            state.context = text.clone();
        }

        let metadata = StepMetadata {
            model: Some(invoker.model().to_string()),
            temperature: config.temperature,
        };
        Ok((NodeOutput::Text(text), metadata))
    }

    async fn run_retriever_node(
        &self,
        node: &PipelineNode,
        config: &RetrieverNodeConfig,
        state: &mut PipelineState,
        warnings: &mut Vec<String>,
    ) -> EngineResult<(NodeOutput, StepMetadata)> {
        let entries = self.knowledge.source(&config.source).ok_or_else(|| {
            EngineError::not_found(format!(
                "knowledge source '{}' referenced by node '{}' is not indexed",
                config.source, node.id
            ))
        })?;
        if entries.is_empty() {
            return Err(EngineError::not_found(format!(
                "knowledge source '{}' referenced by node '{}' has no entries",
                config.source, node.id
            )));
        }

        let query = state.query();
        let query_tokens = tokenizer::token_set(&query);
        let query_embedding = self.embed_query(&query, warnings).await;

        let matches = self
            .search(
                config,
                &query_tokens,
                query_embedding.as_deref(),
                entries,
                warnings,
            )
            .await;

        let context = format_context(&config.source, &matches);
        if !context.is_empty() {
            state.context = context.clone();
        }

        let output = RetrievalOutput {
            source: config.source.clone(),
            matches,
            context,
        };
        let value = serde_json::to_value(&output)?;
        Ok((NodeOutput::Structured(value), StepMetadata::default()))
    }

    /// Embed the retrieval query, degrading to lexical-only on failure.
    async fn embed_query(&self, query: &str, warnings: &mut Vec<String>) -> Option<Vec<f32>> {
        let provider = self.embeddings.as_ref()?;
        if query.is_empty() {
            return None;
        }

        match provider.embed(query).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                let warning = format!("query embedding failed, scoring lexical-only: {}", e);
                tracing::warn!("{}", warning);
                warnings.push(warning);
                None
            }
        }
    }

    /// Query the vector store first; fall back to local scoring on error,
    /// miss, or when no adapter/embedding is available.
    async fn search(
        &self,
        config: &RetrieverNodeConfig,
        query_tokens: &HashSet<String>,
        query_embedding: Option<&[f32]>,
        entries: &[IndexedEntry],
        warnings: &mut Vec<String>,
    ) -> Vec<ScoredMatch> {
        if let (Some(store), Some(embedding)) = (self.vector_store.as_ref(), query_embedding) {
            match store
                .semantic_search(&config.source, embedding, config.top_k)
                .await
            {
                Ok(hits) if !hits.is_empty() => {
                    return hits
                        .into_iter()
                        .enumerate()
                        .map(|(i, hit)| ScoredMatch {
                            rank: i + 1,
                            id: hit.id,
                            title: hit.title,
                            content: hit.content,
                            summary: None,
                            tags: Vec::new(),
                            keywords: Vec::new(),
                            score: hit.score,
                        })
                        .collect();
                }
                Ok(_) => {
                    let warning = format!(
                        "vector store returned no hits for source '{}', falling back to local scoring",
                        config.source
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
                Err(e) => {
                    let warning = format!(
                        "vector store query failed for source '{}', falling back to local scoring: {}",
                        config.source, e
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        scorer::rank(query_tokens, entries, query_embedding, config.top_k)
    }

    async fn run_tool_node(
        &self,
        node: &PipelineNode,
        config: &ToolNodeConfig,
        state: &mut PipelineState,
    ) -> EngineResult<(NodeOutput, StepMetadata)> {
        let registry = self.tools.as_ref().ok_or_else(|| {
            EngineError::invalid_config(format!(
                "node '{}' requires tool '{}' but no tool registry is configured",
                node.id, config.tool_name
            ))
        })?;
        if !registry.contains(&config.tool_name) {
            return Err(EngineError::invalid_config(format!(
                "tool '{}' requested by node '{}' is not registered",
                config.tool_name, node.id
            )));
        }

        let query = state.query();
        let output = registry.invoke(&config.tool_name, &query).await?;

        let block = format!("Tool Output ({}): {}", node.id, output.render());
        if state.context.is_empty() {
            state.context = block;
        } else {
            state.context.push_str("\n\n");
            state.context.push_str(&block);
        }

        Ok((output, StepMetadata::default()))
    }
}

/// Format ranked matches into a context block.
fn format_context(source: &str, matches: &[ScoredMatch]) -> String {
    if matches.is_empty() {
        return String::new();
    }

    let mut block = format!("Relevant knowledge ({}):\n", source);
    for m in matches {
        block.push_str(&format!("\n### {}\n{}\n", m.title, m.content));
    }
    block
}
