//! Services
//!
//! Business logic of the engine: pipeline scheduling and execution,
//! knowledge indexing and retrieval scoring, and the collaborator
//! boundaries (model, embeddings, vector store, tools).

pub mod embedding;
pub mod engine;
pub mod knowledge;
pub mod llm;
pub mod pipeline;
pub mod tools;
pub mod vector_store;
