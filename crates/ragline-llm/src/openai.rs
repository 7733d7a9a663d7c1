//! OpenAI chat client — Chat Completions API with SSE streaming,
//! forced-function structured output, and native tool calling.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::debug;

use ragline_core::{ChatMessage, Error, Provider, Result};

use crate::model::{ChatModel, StreamChunk, TokenStream, ToolCall, ToolSpec, ToolTurn};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiChat {
    client: Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: Option<u32>,
}

impl OpenAiChat {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    fn wire_messages(messages: &[ChatMessage]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect()
    }

    fn base_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": Self::wire_messages(messages),
            "temperature": self.temperature,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    async fn post(&self, body: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream_status(
                status.as_u16(),
                format!("OpenAI API error {}: {}", status, text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("OpenAI response decode failed: {}", e)))
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = self.base_body(messages);
        let parsed = self.post(&body).await?;
        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Parse("OpenAI response missing message content".into()))
    }

    fn stream(&self, messages: Vec<ChatMessage>) -> TokenStream {
        let mut body = self.base_body(&messages);
        body["stream"] = json!(true);

        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let model = self.model.clone();

        Box::pin(async_stream::stream! {
            debug!("Streaming from OpenAI with model {}", model);

            let response = match client
                .post(CHAT_COMPLETIONS_URL)
                .header("Authorization", format!("Bearer {}", api_key))
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield StreamChunk::Error(format!("OpenAI request failed: {}", e));
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                yield StreamChunk::Error(format!("OpenAI API error {}: {}", status, text));
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        yield StreamChunk::Error(format!("Stream read error: {}", e));
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete SSE lines
                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        if data.trim() == "[DONE]" {
                            yield StreamChunk::Done;
                            return;
                        }

                        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) {
                            if let Some(content) =
                                parsed["choices"][0]["delta"]["content"].as_str()
                            {
                                if !content.is_empty() {
                                    yield StreamChunk::Token(content.to_string());
                                }
                            }
                        }
                    }
                }
            }

            yield StreamChunk::Done;
        })
    }

    async fn structured(
        &self,
        messages: &[ChatMessage],
        schema: &serde_json::Value,
        name: &str,
    ) -> Result<serde_json::Value> {
        let mut body = self.base_body(messages);
        body["tools"] = json!([{
            "type": "function",
            "function": {
                "name": name,
                "description": "Format the output according to the schema",
                "parameters": schema,
            },
        }]);
        body["tool_choice"] = json!({
            "type": "function",
            "function": { "name": name },
        });

        let parsed = self.post(&body).await?;
        let arguments = parsed["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .ok_or_else(|| Error::Parse("OpenAI response missing tool call arguments".into()))?;

        serde_json::from_str(arguments)
            .map_err(|e| Error::Parse(format!("tool call arguments are not valid JSON: {}", e)))
    }

    fn supports_native_tools(&self) -> bool {
        true
    }

    async fn complete_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ToolTurn> {
        let mut body = self.base_body(messages);
        body["tools"] = json!(tools
            .iter()
            .map(|t| json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                },
            }))
            .collect::<Vec<_>>());

        let parsed = self.post(&body).await?;
        let message = &parsed["choices"][0]["message"];

        if let Some(tool_calls) = message["tool_calls"].as_array() {
            let mut calls = Vec::new();
            for call in tool_calls {
                let name = call["function"]["name"]
                    .as_str()
                    .ok_or_else(|| Error::Parse("tool call missing function name".into()))?;
                let arguments: serde_json::Value = call["function"]["arguments"]
                    .as_str()
                    .map(serde_json::from_str)
                    .transpose()
                    .map_err(|e| Error::Parse(format!("bad tool arguments: {}", e)))?
                    .unwrap_or(serde_json::Value::Null);
                calls.push(ToolCall {
                    name: name.to_string(),
                    arguments,
                });
            }
            if !calls.is_empty() {
                return Ok(ToolTurn::Calls(calls));
            }
        }

        let content = message["content"].as_str().unwrap_or_default().to_string();
        Ok(ToolTurn::Final(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages_roles() {
        let messages = vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let wire = OpenAiChat::wire_messages(&messages);
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[1]["role"], "user");
        assert_eq!(wire[2]["role"], "assistant");
        assert_eq!(wire[1]["content"], "hi");
    }

    #[test]
    fn test_base_body_omits_max_tokens_when_unset() {
        let model = OpenAiChat::new(Client::new(), "k", "gpt-4o-mini", 0.8, None);
        let body = model.base_body(&[ChatMessage::user("x")]);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["temperature"], 0.8);
        assert_eq!(body["model"], "gpt-4o-mini");
    }
}
