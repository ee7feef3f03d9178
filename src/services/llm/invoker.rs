//! Model Invoker Boundary
//!
//! Defines the opaque interface to the language model. The engine never
//! talks to a provider API itself; it receives a base invoker and derives
//! per-node variants (model/temperature overrides) through the shared
//! variant cache.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::error::EngineResult;

/// Per-node overrides that select a model variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOverrides {
    /// Model name override.
    pub model: Option<String>,
    /// Temperature override.
    pub temperature: Option<f32>,
}

impl ModelOverrides {
    /// Whether any override is set.
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.temperature.is_none()
    }
}

/// Per-invocation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeOptions {
    /// Cap on generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Opaque handle to a language model.
///
/// Failures propagate: the engine performs no retries and a failing
/// invocation aborts the run carrying the upstream message.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Returns the invoker name for identification.
    fn name(&self) -> &'static str;

    /// Returns the model this invoker is bound to.
    fn model(&self) -> &str;

    /// Invoke the model with a fully interpolated prompt.
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> EngineResult<String>;

    /// Construct a variant of this invoker with the given overrides
    /// applied. Called at most once per distinct override combination;
    /// the variant cache guarantees construction is not raced.
    fn with_overrides(&self, overrides: &ModelOverrides) -> Arc<dyn ModelInvoker>;
}
