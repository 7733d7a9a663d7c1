//! Iterative tool-calling agent loop.
//!
//! Each round is one model turn: either a final answer or a set of tool
//! invocations. Tool outputs are folded back into the conversation as
//! plain messages so the loop works identically for providers with and
//! without native tool calling. Every step is emitted verbatim as an
//! [`AgentEvent`].

use std::sync::Arc;

use tracing::{debug, warn};

use ragline_core::ChatMessage;
use ragline_llm::{ChatModel, ToolSpec, ToolTurn};

use crate::events::{AgentEvent, EventStream};
use crate::tool::Tool;

const MAX_ROUNDS: usize = 5;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the tools provided to best assist the user.";

pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { model, tools }
    }

    /// Run the loop to completion, streaming every intermediate event.
    pub fn run(self, input: String) -> EventStream {
        let specs: Vec<ToolSpec> = self.tools.iter().map(|t| t.spec()).collect();
        let model = self.model;
        let tools = self.tools;

        Box::pin(async_stream::stream! {
            yield AgentEvent::ChainStart { input: input.clone() };

            let mut history = vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(input),
            ];

            for round in 0..MAX_ROUNDS {
                debug!("Agent round {}", round);

                let turn = match model.complete_with_tools(&history, &specs).await {
                    Ok(turn) => turn,
                    Err(e) => {
                        yield AgentEvent::Error { error: e.to_string() };
                        return;
                    }
                };

                match turn {
                    ToolTurn::Final(text) => {
                        yield AgentEvent::ModelStream { content: text.clone() };
                        yield AgentEvent::ChainEnd { output: text };
                        return;
                    }
                    ToolTurn::Calls(calls) => {
                        for call in calls {
                            yield AgentEvent::ToolStart {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            };

                            let tool = tools.iter().find(|t| t.name() == call.name);
                            let output = match tool {
                                Some(tool) => match tool.call(call.arguments.clone()).await {
                                    Ok(output) => output,
                                    Err(e) => {
                                        yield AgentEvent::Error { error: e.to_string() };
                                        return;
                                    }
                                },
                                None => {
                                    warn!("Model requested unknown tool {}", call.name);
                                    format!("Unknown tool: {}", call.name)
                                }
                            };

                            yield AgentEvent::ToolEnd {
                                name: call.name.clone(),
                                output: output.clone(),
                            };

                            history.push(ChatMessage::assistant(format!(
                                "Calling tool {} with arguments {}",
                                call.name, call.arguments
                            )));
                            history.push(ChatMessage::user(format!(
                                "Tool {} returned:\n{}\n\nUse this result to answer \
                                 the original question.",
                                call.name, output
                            )));
                        }
                    }
                }
            }

            yield AgentEvent::Error {
                error: format!("agent stopped after {} tool rounds without an answer", MAX_ROUNDS),
            };
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use ragline_core::{Provider, Result};
    use ragline_llm::{StreamChunk, TokenStream, ToolCall};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedModel {
        round: AtomicUsize,
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn provider(&self) -> Provider {
            Provider::OpenAi
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            Ok("done".into())
        }

        fn stream(&self, _messages: Vec<ChatMessage>) -> TokenStream {
            Box::pin(futures::stream::iter(vec![StreamChunk::Done]))
        }

        async fn structured(
            &self,
            _messages: &[ChatMessage],
            _schema: &serde_json::Value,
            _name: &str,
        ) -> Result<serde_json::Value> {
            Ok(serde_json::json!({}))
        }

        fn supports_native_tools(&self) -> bool {
            true
        }

        async fn complete_with_tools(
            &self,
            _messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<ToolTurn> {
            // First turn requests a tool, second answers.
            if self.round.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(ToolTurn::Calls(vec![ToolCall {
                    name: "echo".into(),
                    arguments: serde_json::json!({"text": "ping"}),
                }]))
            } else {
                Ok(ToolTurn::Final("pong".into()))
            }
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn call(&self, arguments: serde_json::Value) -> Result<String> {
            Ok(arguments["text"].as_str().unwrap_or_default().to_string())
        }
    }

    #[tokio::test]
    async fn test_tool_round_then_final_answer() {
        let executor = AgentExecutor::new(
            Arc::new(ScriptedModel {
                round: AtomicUsize::new(0),
            }),
            vec![Arc::new(EchoTool)],
        );

        let events: Vec<AgentEvent> = executor.run("hello".into()).collect().await;

        assert!(matches!(&events[0], AgentEvent::ChainStart { input } if input == "hello"));
        assert!(events
            .iter()
            .any(|e| matches!(e, AgentEvent::ToolStart { name, .. } if name == "echo")));
        assert!(events
            .iter()
            .any(|e| matches!(e, AgentEvent::ToolEnd { output, .. } if output == "ping")));
        assert!(matches!(
            events.last().unwrap(),
            AgentEvent::ChainEnd { output } if output == "pong"
        ));
    }
}
