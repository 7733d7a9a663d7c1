//! Ragline — HTTP server wiring chat, retrieval, and agent endpoints to
//! hosted LLM providers and a vector store.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;
mod stream;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing LLM credentials are fatal at startup.
    let settings = ragline_core::Settings::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;
    let port = settings.port;

    info!("Provider: {}", settings.provider.provider);
    if settings.store.is_none() {
        info!("No vector store configured; retrieval and ingest routes will fail");
    }
    if settings.demo_mode {
        info!("Demo mode enabled; ingest is disabled");
    }

    let state = Arc::new(AppState::new(settings));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Ragline server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
