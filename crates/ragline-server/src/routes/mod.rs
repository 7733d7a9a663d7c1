//! HTTP route handlers.

pub mod agent;
pub mod chat;
pub mod ingest;
pub mod persona;
pub mod retrieval;
pub mod status;
pub mod structured;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chat::routes())
        .merge(persona::routes())
        .merge(retrieval::routes())
        .merge(structured::routes())
        .merge(ingest::routes())
        .merge(agent::routes())
        .merge(status::routes())
}
