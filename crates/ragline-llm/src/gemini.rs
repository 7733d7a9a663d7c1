//! Gemini chat client — Generative Language REST API.
//!
//! Streaming uses `:streamGenerateContent?alt=sse`. Structured output goes
//! through `responseMimeType` + `responseSchema` rather than tool calling;
//! `supports_native_tools` is false, which routes agent and weather flows
//! to schema-guided prompting.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::debug;

use ragline_core::{ChatMessage, Error, Provider, Result, Role};

use crate::model::{
    parse_json_block, ChatModel, StreamChunk, TokenStream, ToolCall, ToolSpec, ToolTurn,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiChat {
    client: Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: Option<u32>,
}

impl GeminiChat {
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

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{}:{}?key={}",
            API_BASE, self.model, method, self.api_key
        )
    }

    /// Split messages into Gemini's `systemInstruction` + `contents` shape.
    /// Assistant turns map to the `model` role.
    fn wire_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                json!({"role": role, "parts": [{"text": m.content}]})
            })
            .collect();

        let mut generation_config = json!({"temperature": self.temperature});
        if let Some(max_tokens) = self.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if !system.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{"text": system.join("\n\n")}],
            });
        }
        body
    }

    async fn post(&self, method: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream_status(
                status.as_u16(),
                format!("Gemini API error {}: {}", status, text),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Gemini response decode failed: {}", e)))
    }

    fn candidate_text(parsed: &serde_json::Value) -> Option<String> {
        let parts = parsed["candidates"][0]["content"]["parts"].as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");
        Some(text)
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = self.wire_body(messages);
        let parsed = self.post("generateContent", &body).await?;
        Self::candidate_text(&parsed)
            .ok_or_else(|| Error::Parse("Gemini response missing candidate text".into()))
    }

    fn stream(&self, messages: Vec<ChatMessage>) -> TokenStream {
        let body = self.wire_body(&messages);
        let url = format!(
            "{}/{}:streamGenerateContent?alt=sse&key={}",
            API_BASE, self.model, self.api_key
        );
        let client = self.client.clone();
        let model = self.model.clone();

        Box::pin(async_stream::stream! {
            debug!("Streaming from Gemini with model {}", model);

            let response = match client.post(&url).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    yield StreamChunk::Error(format!("Gemini request failed: {}", e));
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                yield StreamChunk::Error(format!("Gemini API error {}: {}", status, text));
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

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(data) {
                            if let Some(text) = GeminiChat::candidate_text(&parsed) {
                                if !text.is_empty() {
                                    yield StreamChunk::Token(text);
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
        _name: &str,
    ) -> Result<serde_json::Value> {
        let mut body = self.wire_body(messages);
        body["generationConfig"]["responseMimeType"] = json!("application/json");
        body["generationConfig"]["responseSchema"] = sanitize_schema(schema);

        let parsed = self.post("generateContent", &body).await?;
        let text = Self::candidate_text(&parsed)
            .ok_or_else(|| Error::Parse("Gemini response missing candidate text".into()))?;
        parse_json_block(&text)
    }

    fn supports_native_tools(&self) -> bool {
        false
    }

    /// Tool calling via schema-guided prompting: the system prompt lists
    /// the tools and asks for a `{"tool", "arguments"}` JSON object when
    /// one should run. Plain text is treated as the final answer.
    async fn complete_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ToolTurn> {
        let tool_listing = tools
            .iter()
            .map(|t| {
                format!(
                    "- {}: {}\n  arguments schema: {}",
                    t.name, t.description, t.parameters
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let instructions = format!(
            "You may call the following tools:\n{}\n\n\
             To call a tool, respond with only a JSON object of the form \
             {{\"tool\": \"<name>\", \"arguments\": {{...}}}}. \
             If no tool is needed, answer the user directly in plain text.",
            tool_listing
        );

        let mut prompted = vec![ChatMessage::system(instructions)];
        prompted.extend_from_slice(messages);

        let text = self.complete(&prompted).await?;

        if let Ok(value) = parse_json_block(&text) {
            if let Some(name) = value["tool"].as_str() {
                if tools.iter().any(|t| t.name == name) {
                    return Ok(ToolTurn::Calls(vec![ToolCall {
                        name: name.to_string(),
                        arguments: value["arguments"].clone(),
                    }]));
                }
            }
        }

        Ok(ToolTurn::Final(text))
    }
}

/// Strip JSON Schema keywords the Gemini API rejects.
fn sanitize_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => {
            let cleaned: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "additionalProperties" && k.as_str() != "$schema")
                .map(|(k, v)| (k.clone(), sanitize_schema(v)))
                .collect();
            serde_json::Value::Object(cleaned)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sanitize_schema).collect())
        }
        other => other.clone(),
    }
}
