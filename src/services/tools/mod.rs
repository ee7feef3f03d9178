//! Tool Dispatch Boundary
//!
//! Registry interface for external tool backends. The engine builds a
//! query string from the run state and delegates; an unregistered tool
//! name is a configuration error, not a soft degrade, since it indicates a
//! broken pipeline definition rather than a data-availability gap.

use async_trait::async_trait;

use crate::models::run::NodeOutput;
use crate::utils::error::EngineResult;

/// Dispatches tool invocations by name.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Whether a tool with this name is registered.
    fn contains(&self, tool_name: &str) -> bool;

    /// Invoke a registered tool with the given query.
    ///
    /// Returns a structured result or a plain-text "no match" style
    /// message, at the tool's discretion.
    async fn invoke(&self, tool_name: &str, query: &str) -> EngineResult<NodeOutput>;
}
