//! Retrieval Integration Tests
//!
//! Retriever node behavior end-to-end: local lexical scoring, semantic
//! blending, vector-store precedence and fallback, context overwriting,
//! and the retrieval error taxonomy.

use std::sync::Arc;

use serde_json::json;

use loomflow::{EngineConfig, EngineError, WorkflowEngine};

use crate::support::{hit, BrokenEmbedding, EchoInvoker, KeywordEmbedding, MockVectorStore};

fn support_config() -> EngineConfig {
    serde_json::from_value(json!({
        "pipelines": [{
            "name": "lookup",
            "nodes": [
                {"id": "fetch", "type": "retriever",
                 "config": {"source": "faq", "topK": 2}}
            ]
        }],
        "knowledgeBases": {
            "faq": [
                {"title": "Password reset", "content": "Visit the account page to reset.",
                 "tags": ["account"], "priority": 1.0},
                {"title": "Password policy", "content": "Passwords rotate quarterly.",
                 "priority": 2.0},
                {"title": "Shipping times", "content": "Orders ship within two days."}
            ]
        }
    }))
    .unwrap()
}

fn retrieval_matches(result: &loomflow::PipelineRunResult) -> Vec<(String, f64)> {
    retrieval_matches_at(result, 0)
}

fn retrieval_matches_at(result: &loomflow::PipelineRunResult, step: usize) -> Vec<(String, f64)> {
    let output = match &result.steps[step].output {
        loomflow::NodeOutput::Structured(value) => value.clone(),
        other => panic!("expected structured retriever output, got {:?}", other),
    };
    output["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["title"].as_str().unwrap().to_string(),
                m["score"].as_f64().unwrap(),
            )
        })
        .collect()
}

// ============================================================================
// Local lexical scoring
// ============================================================================

#[tokio::test]
async fn test_lexical_ranking_prefers_priority() {
    let engine = WorkflowEngine::new(Arc::new(EchoInvoker::new()), None, None, None);
    engine.load(support_config()).await;

    let result = engine.run("lookup", "password help").await.unwrap();
    let matches = retrieval_matches(&result);

    assert_eq!(matches.len(), 2);
    // Both password entries overlap equally; priority 2.0 ranks first.
    assert_eq!(matches[0].0, "Password policy");
    assert_eq!(matches[1].0, "Password reset");
    assert!(matches[0].1 > matches[1].1);
}

#[tokio::test]
async fn test_retrieval_overwrites_context() {
    let engine = WorkflowEngine::new(Arc::new(EchoInvoker::new()), None, None, None);
    engine.load(support_config()).await;

    let result = engine.run("lookup", "password help").await.unwrap();
    assert!(result.context.starts_with("Relevant knowledge (faq):"));
    assert!(result.context.contains("Password policy"));
}

#[tokio::test]
async fn test_no_match_fallback_returns_head_entries() {
    let engine = WorkflowEngine::new(Arc::new(EchoInvoker::new()), None, None, None);
    engine.load(support_config()).await;

    let result = engine.run("lookup", "quantum entanglement").await.unwrap();
    let matches = retrieval_matches(&result);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].0, "Password reset");
    assert_eq!(matches[1].0, "Password policy");
    assert!(matches.iter().all(|(_, score)| *score == 0.0));
}

// ============================================================================
// Embedding degradation
// ============================================================================

#[tokio::test]
async fn test_broken_embedding_degrades_to_lexical_with_warning() {
    let engine = WorkflowEngine::new(
        Arc::new(EchoInvoker::new()),
        Some(Arc::new(BrokenEmbedding)),
        None,
        None,
    );
    engine.load(support_config()).await;

    let result = engine.run("lookup", "password help").await.unwrap();
    let matches = retrieval_matches(&result);

    // Indexing and querying both failed to embed; lexical path still ranks.
    assert_eq!(matches[0].0, "Password policy");
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.contains("lexical-only")),
        "expected an embedding warning, got {:?}",
        result.warnings
    );
}

#[tokio::test]
async fn test_semantic_blend_lifts_matching_entry() {
    // Embedding keyed on "shipping": the query and the shipping entry get
    // parallel vectors, the password entries get zero vectors.
    let engine = WorkflowEngine::new(
        Arc::new(EchoInvoker::new()),
        Some(Arc::new(KeywordEmbedding::new(&["shipping", "orders"]))),
        None,
        None,
    );
    engine.load(support_config()).await;

    let result = engine.run("lookup", "when does shipping happen").await.unwrap();
    let matches = retrieval_matches(&result);

    assert_eq!(matches[0].0, "Shipping times");
}

// ============================================================================
// Vector store precedence
// ============================================================================

#[tokio::test]
async fn test_vector_store_hits_take_precedence() {
    let store = MockVectorStore::Hits(vec![
        hit("Stored answer", "from the durable index", 0.97),
        hit("Second stored", "also from the index", 0.62),
    ]);
    let engine = WorkflowEngine::new(
        Arc::new(EchoInvoker::new()),
        Some(Arc::new(KeywordEmbedding::new(&["password"]))),
        Some(Arc::new(store)),
        None,
    );
    engine.load(support_config()).await;

    let result = engine.run("lookup", "password help").await.unwrap();
    let matches = retrieval_matches(&result);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].0, "Stored answer");
    assert!((matches[0].1 - 0.97).abs() < 1e-6);
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_empty_vector_store_falls_back_to_local() {
    let engine = WorkflowEngine::new(
        Arc::new(EchoInvoker::new()),
        Some(Arc::new(KeywordEmbedding::new(&["password"]))),
        Some(Arc::new(MockVectorStore::Empty)),
        None,
    );
    engine.load(support_config()).await;

    let result = engine.run("lookup", "password help").await.unwrap();
    let matches = retrieval_matches(&result);

    assert_eq!(matches[0].0, "Password policy");
    assert!(
        result.warnings.iter().any(|w| w.contains("no hits")),
        "expected a fallback warning, got {:?}",
        result.warnings
    );
}

#[tokio::test]
async fn test_broken_vector_store_falls_back_to_local() {
    let engine = WorkflowEngine::new(
        Arc::new(EchoInvoker::new()),
        Some(Arc::new(KeywordEmbedding::new(&["password"]))),
        Some(Arc::new(MockVectorStore::Broken)),
        None,
    );
    engine.load(support_config()).await;

    let result = engine.run("lookup", "password help").await.unwrap();
    let matches = retrieval_matches(&result);

    assert_eq!(matches[0].0, "Password policy");
    assert!(
        result.warnings.iter().any(|w| w.contains("failed")),
        "expected a failure warning, got {:?}",
        result.warnings
    );
}

// ============================================================================
// Retrieval error taxonomy
// ============================================================================

#[tokio::test]
async fn test_missing_source_config_is_invalid() {
    let engine = WorkflowEngine::new(Arc::new(EchoInvoker::new()), None, None, None);
    let config: EngineConfig = serde_json::from_value(json!({
        "pipelines": [{
            "name": "broken",
            "nodes": [{"id": "fetch-docs", "type": "retriever", "config": {}}]
        }]
    }))
    .unwrap();
    engine.load(config).await;

    let err = engine.run("broken", "q").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
    assert!(err.to_string().contains("fetch-docs"), "{}", err);
}

#[tokio::test]
async fn test_unknown_source_is_not_found() {
    let engine = WorkflowEngine::new(Arc::new(EchoInvoker::new()), None, None, None);
    let config: EngineConfig = serde_json::from_value(json!({
        "pipelines": [{
            "name": "broken",
            "nodes": [{"id": "fetch", "type": "retriever", "config": {"source": "nowhere"}}]
        }]
    }))
    .unwrap();
    engine.load(config).await;

    let err = engine.run("broken", "q").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(err.to_string().contains("nowhere"), "{}", err);
}

#[tokio::test]
async fn test_empty_source_is_not_found() {
    let engine = WorkflowEngine::new(Arc::new(EchoInvoker::new()), None, None, None);
    let config: EngineConfig = serde_json::from_value(json!({
        "pipelines": [{
            "name": "broken",
            "nodes": [{"id": "fetch", "type": "retriever", "config": {"source": "hollow"}}]
        }],
        "knowledgeBases": {"hollow": []}
    }))
    .unwrap();
    engine.load(config).await;

    let err = engine.run("broken", "q").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(err.to_string().contains("hollow"), "{}", err);
}

// ============================================================================
// Intent-aware retrieval
// ============================================================================

#[tokio::test]
async fn test_retrieval_query_includes_detected_intent() {
    // The intent node answers "shipping"; the retriever should pick the
    // shipping entry even though the raw input never mentions it.
    let invoker = Arc::new(EchoInvoker::new().with_reply("Classify", "shipping orders"));
    let engine = WorkflowEngine::new(invoker, None, None, None);
    let config: EngineConfig = serde_json::from_value(json!({
        "pipelines": [{
            "name": "routed",
            "nodes": [
                {"id": "intent", "type": "llm", "config": {"prompt": "Classify: {input}"}},
                {"id": "fetch", "type": "retriever", "config": {"source": "faq", "topK": 1}}
            ]
        }],
        "knowledgeBases": {
            "faq": [
                {"title": "Password reset", "content": "Visit the account page."},
                {"title": "Shipping times", "content": "Orders ship within two days."}
            ]
        }
    }))
    .unwrap();
    engine.load(config).await;

    let result = engine.run("routed", "how long until it arrives").await.unwrap();
    let matches = retrieval_matches_at(&result, 1);
    assert_eq!(matches[0].0, "Shipping times");
    assert_eq!(result.intent, "shipping orders");
}
