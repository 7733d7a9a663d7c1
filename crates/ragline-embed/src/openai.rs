//! OpenAI `text-embedding-3-small` client (1536 dimensions).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use ragline_core::{Error, Result};

use crate::Embeddings;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub(crate) const MODEL: &str = "text-embedding-3-small";
pub(crate) const DIMENSION: usize = 1536;

pub struct OpenAiEmbeddings {
    client: Client,
    api_key: String,
}

impl OpenAiEmbeddings {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let body = json!({
            "model": MODEL,
            "input": inputs,
        });

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("OpenAI embeddings request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream_status(
                status.as_u16(),
                format!("OpenAI embeddings API error {}: {}", status, text),
            ));
        }

        let parsed: serde_json::Value = response.json().await.map_err(|e| {
            Error::upstream(format!("OpenAI embeddings response decode failed: {}", e))
        })?;

        let data = parsed["data"]
            .as_array()
            .ok_or_else(|| Error::Parse("embeddings data missing from response".into()))?;

        data.iter()
            .map(|entry| {
                entry["embedding"]
                    .as_array()
                    .ok_or_else(|| Error::Parse("embedding vector missing".into()))?
                    .iter()
                    .map(|v| {
                        v.as_f64()
                            .map(|f| f as f32)
                            .ok_or_else(|| Error::Parse("non-numeric embedding value".into()))
                    })
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl Embeddings for OpenAiEmbeddings {
    fn model_name(&self) -> &str {
        MODEL
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Parse("empty embeddings response".into()))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<&str> = texts.iter().map(|t| t.as_str()).collect();
        self.embed(&inputs).await
    }
}
