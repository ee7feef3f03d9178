//! Loomflow - Configurable LLM Workflow Engine
//!
//! Executes declarative pipelines of generation and retrieval steps to
//! answer a user request, blending locally computed lexical relevance with
//! externally produced semantic embeddings. It includes:
//! - Pipeline scheduling (topological ordering with cycle tolerance)
//! - Stateful node execution with `{token}` template interpolation
//! - Knowledge-base indexing and hybrid lexical/semantic ranking
//! - Opaque collaborator boundaries for models, embeddings, vector
//!   stores, and tools

pub mod models;
pub mod services;
pub mod utils;

// Re-export the engine surface
pub use models::config::EngineConfig;
pub use models::knowledge::{IndexedEntry, KnowledgeEntry, ScoredMatch};
pub use models::pipeline::{
    LlmNodeConfig, NodeKind, NodeType, PipelineDefinition, PipelineEdge, PipelineNode,
    RetrieverNodeConfig, ToolNodeConfig,
};
pub use models::run::{NodeOutput, PipelineRunResult, PipelineState, StepMetadata, StepRecord};
pub use services::embedding::EmbeddingProvider;
pub use services::engine::WorkflowEngine;
pub use services::llm::{InvokeOptions, ModelInvoker, ModelOverrides, ModelVariantCache};
pub use services::tools::ToolRegistry;
pub use services::vector_store::{SemanticHit, VectorStoreAdapter};
pub use utils::error::{EngineError, EngineResult};
