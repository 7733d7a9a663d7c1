//! Google `embedding-001` client (768 dimensions).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use ragline_core::{Error, Result};

use crate::Embeddings;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub(crate) const MODEL: &str = "embedding-001";
pub(crate) const DIMENSION: usize = 768;

pub struct GoogleEmbeddings {
    client: Client,
    api_key: String,
}

impl GoogleEmbeddings {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn post(&self, method: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/{}:{}?key={}", API_BASE, MODEL, method, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Google embeddings request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream_status(
                status.as_u16(),
                format!("Google embeddings API error {}: {}", status, text),
            ));
        }

        response.json().await.map_err(|e| {
            Error::upstream(format!("Google embeddings response decode failed: {}", e))
        })
    }
}

fn values_to_vec(values: &serde_json::Value) -> Result<Vec<f32>> {
    values
        .as_array()
        .ok_or_else(|| Error::Parse("embedding values missing from response".into()))?
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| Error::Parse("non-numeric embedding value".into()))
        })
        .collect()
}

#[async_trait]
impl Embeddings for GoogleEmbeddings {
    fn model_name(&self) -> &str {
        MODEL
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": format!("models/{}", MODEL),
            "content": {"parts": [{"text": text}]},
        });
        let parsed = self.post("embedContent", &body).await?;
        values_to_vec(&parsed["embedding"]["values"])
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|t| {
                json!({
                    "model": format!("models/{}", MODEL),
                    "content": {"parts": [{"text": t}]},
                })
            })
            .collect();
        let body = json!({"requests": requests});
        let parsed = self.post("batchEmbedContents", &body).await?;

        let embeddings = parsed["embeddings"]
            .as_array()
            .ok_or_else(|| Error::Parse("embeddings array missing from response".into()))?;
        embeddings
            .iter()
            .map(|e| values_to_vec(&e["values"]))
            .collect()
    }
}
