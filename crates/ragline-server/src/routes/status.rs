//! Status route: active provider and configuration summary. Keys are
//! never echoed.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use ragline_core::Provider;
use ragline_embed::embedding_defaults;
use ragline_llm::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(status))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let provider = state.settings.provider.provider;
    let default_model = match provider {
        Provider::Google => DEFAULT_GEMINI_MODEL,
        Provider::OpenAi => DEFAULT_OPENAI_MODEL,
    };
    // Constants only; no embeddings client is built for a status poll.
    let (embedding_model, embedding_dimension) = embedding_defaults(provider);

    Json(serde_json::json!({
        "provider": provider.to_string(),
        "defaultModel": default_model,
        "embeddingModel": embedding_model,
        "embeddingDimension": embedding_dimension,
        "storeConfigured": state.settings.store.is_some(),
        "demoMode": state.settings.demo_mode,
    }))
}
