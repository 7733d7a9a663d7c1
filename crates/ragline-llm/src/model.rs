//! The chat model capability trait and streaming types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use ragline_core::{ChatMessage, Provider, Result};

/// Boxed stream of partial results from a model call.
pub type TokenStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token, completion signal, or error.
///
/// `Done` is emitted exactly once per stream; nothing follows it.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done,
    Error(String),
}

/// A tool made available to a tool-calling turn.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Outcome of one tool-calling turn.
#[derive(Debug, Clone)]
pub enum ToolTurn {
    /// The model answered directly.
    Final(String),
    /// The model asked for one or more tool invocations.
    Calls(Vec<ToolCall>),
}

/// Common capability interface over hosted chat models.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn provider(&self) -> Provider;

    fn model_name(&self) -> &str;

    /// One-shot completion, full response text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Stream the response token by token. Emission order follows the
    /// provider; completion is signaled exactly once.
    fn stream(&self, messages: Vec<ChatMessage>) -> TokenStream;

    /// Invoke with a bound output schema; returns the parsed JSON object.
    async fn structured(
        &self,
        messages: &[ChatMessage],
        schema: &serde_json::Value,
        name: &str,
    ) -> Result<serde_json::Value>;

    /// Whether the provider supports native function/tool calling.
    fn supports_native_tools(&self) -> bool;

    /// One tool-calling turn: either a final answer or tool invocations.
    async fn complete_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ToolTurn>;
}

/// Extract the first JSON object embedded in model output. Tolerates
/// surrounding prose and fenced code blocks.
pub fn parse_json_block(text: &str) -> Result<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }
    Err(ragline_core::Error::Parse(format!(
        "no JSON object found in model output: {}",
        text
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_block_plain() {
        let value = parse_json_block(r#"{"city": "Austin", "state": "TX"}"#).unwrap();
        assert_eq!(value["city"], "Austin");
    }

    #[test]
    fn test_parse_json_block_fenced() {
        let text = "Here you go:\n```json\n{\"city\": \"Austin\", \"state\": \"TX\"}\n```\n";
        let value = parse_json_block(text).unwrap();
        assert_eq!(value["state"], "TX");
    }

    #[test]
    fn test_parse_json_block_rejects_prose() {
        assert!(parse_json_block("sorry, I cannot do that").is_err());
    }
}
