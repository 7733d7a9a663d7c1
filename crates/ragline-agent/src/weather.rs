//! Weather parameter extraction with three strategies.
//!
//! The two supported providers differ in native tool-calling support, so
//! the same `{city, state}` schema can be bound three ways: native
//! structured output, schema-guided prompting with JSON parsing, or plain
//! prompting. Results stream as verbatim agent events.

use std::sync::Arc;

use serde_json::json;
use tokio_stream::StreamExt;

use ragline_core::ChatMessage;
use ragline_llm::{parse_json_block, ChatModel, StreamChunk};

use crate::events::{AgentEvent, EventStream};

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the tools provided to best assist the user.";

/// JSON Schema for weather search parameters.
pub fn weather_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "description": "Weather search parameters",
        "properties": {
            "city": {
                "type": "string",
                "description": "City to search for weather",
            },
            "state": {
                "type": "string",
                "description": "State abbreviation to search for weather",
            },
        },
        "required": ["city", "state"],
    })
}

/// How the weather schema is bound to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherStrategy {
    /// Native structured-output binding.
    Structured,
    /// Format-instruction prompting plus JSON parsing.
    SchemaPrompt,
    /// Plain prompting, raw text streamed.
    Plain,
}

impl WeatherStrategy {
    /// Parse a request flag, falling back to provider capability:
    /// models with native tool calling get structured binding, the rest
    /// get schema-guided prompting.
    pub fn resolve(flag: Option<&str>, model: &dyn ChatModel) -> Self {
        match flag {
            Some("structured") => WeatherStrategy::Structured,
            Some("schema_prompt") => WeatherStrategy::SchemaPrompt,
            Some("plain") => WeatherStrategy::Plain,
            _ => {
                if model.supports_native_tools() {
                    WeatherStrategy::Structured
                } else {
                    WeatherStrategy::SchemaPrompt
                }
            }
        }
    }
}

fn format_instructions(schema: &serde_json::Value) -> String {
    format!(
        "To get the weather, respond with only a JSON object matching this schema:\n{}",
        serde_json::to_string_pretty(schema).unwrap_or_default()
    )
}

/// Run the weather extraction, streaming every step as an event.
pub fn run_weather(
    model: Arc<dyn ChatModel>,
    input: String,
    strategy: WeatherStrategy,
) -> EventStream {
    Box::pin(async_stream::stream! {
        yield AgentEvent::ChainStart { input: input.clone() };

        match strategy {
            WeatherStrategy::Structured => {
                let messages = vec![
                    ChatMessage::system(SYSTEM_PROMPT),
                    ChatMessage::user(input),
                ];
                match model
                    .structured(&messages, &weather_schema(), "get_weather")
                    .await
                {
                    Ok(value) => {
                        let text = value.to_string();
                        yield AgentEvent::ModelStream { content: text.clone() };
                        yield AgentEvent::ChainEnd { output: text };
                    }
                    Err(e) => {
                        yield AgentEvent::Error { error: e.to_string() };
                    }
                }
            }
            WeatherStrategy::SchemaPrompt => {
                let system = format!(
                    "{}\n\n{}",
                    SYSTEM_PROMPT,
                    format_instructions(&weather_schema())
                );
                let messages = vec![ChatMessage::system(system), ChatMessage::user(input)];
                match model.complete(&messages).await {
                    Ok(text) => match parse_json_block(&text) {
                        Ok(value) => {
                            let out = value.to_string();
                            yield AgentEvent::ModelStream { content: out.clone() };
                            yield AgentEvent::ChainEnd { output: out };
                        }
                        Err(e) => {
                            yield AgentEvent::Error { error: e.to_string() };
                        }
                    },
                    Err(e) => {
                        yield AgentEvent::Error { error: e.to_string() };
                    }
                }
            }
            WeatherStrategy::Plain => {
                let messages = vec![
                    ChatMessage::system(SYSTEM_PROMPT),
                    ChatMessage::user(input),
                ];
                let mut stream = model.stream(messages);
                let mut full = String::new();
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        StreamChunk::Token(text) => {
                            full.push_str(&text);
                            yield AgentEvent::ModelStream { content: text };
                        }
                        StreamChunk::Done => {
                            yield AgentEvent::ChainEnd { output: full };
                            return;
                        }
                        StreamChunk::Error(e) => {
                            yield AgentEvent::Error { error: e };
                            return;
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::{Provider, Result};
    use ragline_llm::{TokenStream, ToolSpec, ToolTurn};

    struct FixedModel {
        native_tools: bool,
        reply: String,
    }

    #[async_trait]
    impl ChatModel for FixedModel {
        fn provider(&self) -> Provider {
            Provider::Google
        }

        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            Ok(self.reply.clone())
        }

        fn stream(&self, _messages: Vec<ChatMessage>) -> TokenStream {
            let chunks = vec![
                StreamChunk::Token(self.reply.clone()),
                StreamChunk::Done,
            ];
            Box::pin(futures::stream::iter(chunks))
        }

        async fn structured(
            &self,
            _messages: &[ChatMessage],
            _schema: &serde_json::Value,
            _name: &str,
        ) -> Result<serde_json::Value> {
            Ok(json!({"city": "Austin", "state": "TX"}))
        }

        fn supports_native_tools(&self) -> bool {
            self.native_tools
        }

        async fn complete_with_tools(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<ToolTurn> {
            Ok(ToolTurn::Final(self.reply.clone()))
        }
    }

    #[test]
    fn test_strategy_resolution() {
        let native = FixedModel {
            native_tools: true,
            reply: String::new(),
        };
        let prompted = FixedModel {
            native_tools: false,
            reply: String::new(),
        };
        assert_eq!(
            WeatherStrategy::resolve(None, &native),
            WeatherStrategy::Structured
        );
        assert_eq!(
            WeatherStrategy::resolve(None, &prompted),
            WeatherStrategy::SchemaPrompt
        );
        assert_eq!(
            WeatherStrategy::resolve(Some("plain"), &native),
            WeatherStrategy::Plain
        );
    }

    #[test]
    fn test_weather_schema_fields() {
        let schema = weather_schema();
        assert_eq!(schema["properties"]["city"]["type"], "string");
        assert_eq!(schema["properties"]["state"]["type"], "string");
        assert_eq!(schema["required"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_schema_prompt_parses_json_reply() {
        let model = Arc::new(FixedModel {
            native_tools: false,
            reply: "```json\n{\"city\": \"Austin\", \"state\": \"TX\"}\n```".into(),
        });
        let events: Vec<AgentEvent> =
            run_weather(model, "weather in austin".into(), WeatherStrategy::SchemaPrompt)
                .collect()
                .await;
        assert!(matches!(
            events.last().unwrap(),
            AgentEvent::ChainEnd { output } if output.contains("Austin")
        ));
    }

    #[tokio::test]
    async fn test_plain_streams_tokens() {
        let model = Arc::new(FixedModel {
            native_tools: false,
            reply: "sunny".into(),
        });
        let events: Vec<AgentEvent> =
            run_weather(model, "weather?".into(), WeatherStrategy::Plain)
                .collect()
                .await;
        assert!(events
            .iter()
            .any(|e| matches!(e, AgentEvent::ModelStream { content } if content == "sunny")));
        assert!(matches!(
            events.last().unwrap(),
            AgentEvent::ChainEnd { output } if output == "sunny"
        ));
    }
}
