//! Engine Configuration
//!
//! The parsed configuration document: pipeline definitions plus named
//! knowledge bases. Loading the file from disk is the host application's
//! responsibility; this model only fixes the document's shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::knowledge::KnowledgeEntry;
use crate::models::pipeline::PipelineDefinition;
use crate::utils::error::EngineResult;

/// A full engine configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Declared pipelines.
    #[serde(default)]
    pub pipelines: Vec<PipelineDefinition>,
    /// Named knowledge bases available to retriever nodes.
    #[serde(default)]
    pub knowledge_bases: HashMap<String, Vec<KnowledgeEntry>>,
}

impl EngineConfig {
    /// Parse a configuration document from a JSON string.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a pipeline by name, case-insensitively.
    pub fn pipeline(&self, name: &str) -> Option<&PipelineDefinition> {
        self.pipelines
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}
