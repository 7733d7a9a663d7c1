//! Document ingestion: split, embed, upsert.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use ragline_core::Error;
use ragline_ingest::{MarkdownSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use ragline_store::DocumentRow;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub text: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/retrieval/ingest", post(ingest))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    // The demo-mode gate comes first: no embeddings or store client is
    // constructed for a rejected request.
    ensure_ingest_allowed(state.settings.demo_mode)?;

    let splitter = MarkdownSplitter::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);
    let chunks = splitter.split(&body.text);
    info!("Ingest: split into {} chunks", chunks.len());

    if chunks.is_empty() {
        return Ok(Json(json!({ "ok": true })));
    }

    let embeddings = state.embeddings();
    let store = state.store()?;

    let vectors = embeddings.embed_documents(&chunks).await?;
    let rows = build_rows(chunks, vectors)?;

    store.add_documents(&rows).await?;
    info!("Ingest: stored {} rows", rows.len());

    Ok(Json(json!({ "ok": true })))
}

/// Pair every chunk with its embedding. A count mismatch from the
/// provider fails the whole ingest; nothing partial is stored.
fn build_rows(chunks: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Vec<DocumentRow>, Error> {
    if vectors.len() != chunks.len() {
        return Err(Error::upstream(format!(
            "embedding count mismatch: {} chunks but {} vectors",
            chunks.len(),
            vectors.len()
        )));
    }
    Ok(chunks
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(index, (content, embedding))| DocumentRow {
            content,
            metadata: json!({ "chunk": index }),
            embedding,
        })
        .collect())
}

/// Ingestion is rejected outright in demo mode.
fn ensure_ingest_allowed(demo_mode: bool) -> Result<(), Error> {
    if demo_mode {
        Err(Error::DemoRestricted)
    } else {
        Ok(())
    }
}
