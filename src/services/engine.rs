//! Workflow Engine Facade
//!
//! Owns the loaded configuration snapshot (pipeline definitions plus the
//! knowledge index) and the shared collaborators, and exposes the per-run
//! entry point. Reloading a configuration rebuilds the knowledge index and
//! swaps the whole snapshot atomically, so in-flight runs keep the
//! snapshot they started with and later runs see only the new one.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::config::EngineConfig;
use crate::models::pipeline::PipelineDefinition;
use crate::models::run::PipelineRunResult;
use crate::services::embedding::EmbeddingProvider;
use crate::services::knowledge::{KnowledgeIndex, KnowledgeIndexer};
use crate::services::llm::{ModelInvoker, ModelVariantCache};
use crate::services::pipeline::PipelineExecutor;
use crate::services::tools::ToolRegistry;
use crate::services::vector_store::VectorStoreAdapter;
use crate::utils::error::{EngineError, EngineResult};

/// The loaded configuration: definitions plus the derived index.
struct Snapshot {
    pipelines: Vec<Arc<PipelineDefinition>>,
    index: Arc<KnowledgeIndex>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            pipelines: Vec::new(),
            index: Arc::new(KnowledgeIndex::default()),
        }
    }

    fn pipeline(&self, name: &str) -> Option<Arc<PipelineDefinition>> {
        self.pipelines
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

/// Entry point for pipeline execution.
pub struct WorkflowEngine {
    snapshot: RwLock<Snapshot>,
    indexer: KnowledgeIndexer,
    models: Arc<ModelVariantCache>,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStoreAdapter>>,
    tools: Option<Arc<dyn ToolRegistry>>,
}

impl WorkflowEngine {
    /// Create an engine around the given collaborators, with no
    /// configuration loaded yet.
    pub fn new(
        base_invoker: Arc<dyn ModelInvoker>,
        embeddings: Option<Arc<dyn EmbeddingProvider>>,
        vector_store: Option<Arc<dyn VectorStoreAdapter>>,
        tools: Option<Arc<dyn ToolRegistry>>,
    ) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::empty()),
            indexer: KnowledgeIndexer::new(embeddings.clone()),
            models: Arc::new(ModelVariantCache::new(base_invoker)),
            embeddings,
            vector_store,
            tools,
        }
    }

    /// Load (or reload) a configuration.
    ///
    /// Indexes every knowledge base, then swaps the snapshot in one write:
    /// an atomic full replacement. Entries absent from the new
    /// configuration vanish from subsequent retrieval.
    pub async fn load(&self, config: EngineConfig) {
        let index = self.indexer.build_index(&config.knowledge_bases).await;
        let pipelines: Vec<Arc<PipelineDefinition>> =
            config.pipelines.into_iter().map(Arc::new).collect();

        tracing::info!(
            pipelines = pipelines.len(),
            sources = index.source_names().len(),
            entries = index.entry_count(),
            "configuration loaded"
        );

        let mut snapshot = self.snapshot.write().await;
        *snapshot = Snapshot {
            pipelines,
            index: Arc::new(index),
        };
    }

    /// Run a pipeline by name (case-insensitive) against the user input.
    pub async fn run(&self, pipeline_name: &str, input: &str) -> EngineResult<PipelineRunResult> {
        let (pipeline, index) = {
            let snapshot = self.snapshot.read().await;
            let pipeline = snapshot.pipeline(pipeline_name).ok_or_else(|| {
                EngineError::not_found(format!("pipeline '{}' is not configured", pipeline_name))
            })?;
            (pipeline, snapshot.index.clone())
        };

        let executor = PipelineExecutor::new(
            self.models.clone(),
            index,
            self.embeddings.clone(),
            self.vector_store.clone(),
            self.tools.clone(),
        );
        executor.run(&pipeline, input).await
    }

    /// Names of all loaded pipelines, in declaration order.
    pub async fn list_pipelines(&self) -> Vec<String> {
        self.snapshot
            .read()
            .await
            .pipelines
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Names of all indexed knowledge sources.
    pub async fn knowledge_sources(&self) -> Vec<String> {
        self.snapshot.read().await.index.source_names()
    }
}
