//! Logging decorator around any embeddings client.
//!
//! Records text previews, batch sizes, result dimensionality, and a short
//! numeric prefix of the first vector. Vectors pass through unaltered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use ragline_core::Result;

use crate::Embeddings;

pub struct LoggingEmbeddings {
    inner: Arc<dyn Embeddings>,
    label: String,
}

impl LoggingEmbeddings {
    pub fn new(inner: Arc<dyn Embeddings>, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

fn vector_prefix(vector: &[f32], n: usize) -> String {
    vector
        .iter()
        .take(n)
        .map(|v| format!("{:.4}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Embeddings for LoggingEmbeddings {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        info!("[{}] Embedding query: \"{}\"", self.label, preview(text, 50));
        let vector = self.inner.embed_query(text).await?;
        info!("[{}] Embedding dimensions: {}", self.label, vector.len());
        info!(
            "[{}] First 5 values: [{}]",
            self.label,
            vector_prefix(&vector, 5)
        );
        Ok(vector)
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        info!("[{}] Embedding {} documents", self.label, texts.len());
        if let Some(first) = texts.first() {
            info!(
                "[{}] First document preview: \"{}\"",
                self.label,
                preview(first, 50)
            );
        }
        let vectors = self.inner.embed_documents(texts).await?;
        info!(
            "[{}] Embeddings created with dimensions: {}",
            self.label,
            vectors.first().map(|v| v.len()).unwrap_or(0)
        );
        Ok(vectors)
    }
}
