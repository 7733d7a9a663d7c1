//! Embedding clients behind the [`Embeddings`] trait.
//!
//! `select_embeddings` maps the configured provider to its embedding
//! model and always wraps the client in [`LoggingEmbeddings`].

pub mod google;
pub mod logging;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use ragline_core::{Provider, ProviderConfig, Result};

pub use google::GoogleEmbeddings;
pub use logging::LoggingEmbeddings;
pub use openai::OpenAiEmbeddings;

/// Common embeddings capability interface.
#[async_trait]
pub trait Embeddings: Send + Sync {
    fn model_name(&self) -> &str;

    /// Output vector dimensionality.
    fn dimension(&self) -> usize;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of document chunks.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Default embedding model name and dimension for a provider, without
/// constructing a client.
pub fn embedding_defaults(provider: Provider) -> (&'static str, usize) {
    match provider {
        Provider::Google => (google::MODEL, google::DIMENSION),
        Provider::OpenAi => (openai::MODEL, openai::DIMENSION),
    }
}

/// Build the logging-wrapped embeddings client for the configured provider.
pub fn select_embeddings(client: &Client, config: &ProviderConfig) -> Arc<dyn Embeddings> {
    let inner: Arc<dyn Embeddings> = match config.provider {
        Provider::Google => {
            info!("Using Google embeddings");
            Arc::new(GoogleEmbeddings::new(client.clone(), config.api_key.clone()))
        }
        Provider::OpenAi => {
            info!("Using OpenAI embeddings");
            Arc::new(OpenAiEmbeddings::new(client.clone(), config.api_key.clone()))
        }
    };
    let label = format!("{}-embeddings", config.provider);
    Arc::new(LoggingEmbeddings::new(inner, label))
}
