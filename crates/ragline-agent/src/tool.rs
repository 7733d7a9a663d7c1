//! The tool capability interface.

use async_trait::async_trait;

use ragline_core::Result;
use ragline_llm::ToolSpec;

/// A callable tool the model can invoke with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters(&self) -> serde_json::Value;

    /// Execute with the model-supplied arguments, returning text output.
    async fn call(&self, arguments: serde_json::Value) -> Result<String>;

    /// The spec handed to the model for this tool.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}
