//! Shared application state.
//!
//! Settings are read once at startup; provider clients are constructed per
//! request from them, so requests stay independent and stateless. The
//! `reqwest::Client` is shared for connection pooling.

use std::sync::Arc;

use reqwest::Client;

use ragline_core::{Error, Result, Settings};
use ragline_embed::Embeddings;
use ragline_llm::{select_chat_model, ChatModel, ChatModelOptions};
use ragline_store::SupabaseStore;

pub struct AppState {
    pub settings: Settings,
    pub http: Client,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            http: Client::new(),
        }
    }

    /// Chat model for the configured provider.
    pub fn chat_model(&self, options: ChatModelOptions) -> Box<dyn ChatModel> {
        select_chat_model(&self.http, &self.settings.provider, options)
    }

    /// Logging-wrapped embeddings for the configured provider.
    pub fn embeddings(&self) -> Arc<dyn Embeddings> {
        ragline_embed::select_embeddings(&self.http, &self.settings.provider)
    }

    /// Vector store client, if a store connection is configured.
    pub fn store(&self) -> Result<SupabaseStore> {
        let config = self.settings.store.as_ref().ok_or_else(|| {
            Error::Config(
                "No vector store configured. Set SUPABASE_URL and SUPABASE_SERVICE_KEY.".into(),
            )
        })?;
        Ok(SupabaseStore::new(self.http.clone(), config))
    }
}
