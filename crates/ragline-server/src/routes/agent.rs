//! Agent routes: tool-calling search agent and the weather tool.
//!
//! Both stream every intermediate execution event verbatim as SSE.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::Sse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use ragline_agent::{run_weather, AgentExecutor, TavilySearch, Tool, WeatherStrategy};
use ragline_core::Error;
use ragline_llm::{ChatModel, ChatModelOptions};

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::{sse_event_response, SseStream};

#[derive(Debug, Deserialize)]
pub struct AgentBody {
    pub input: String,
    /// Weather route only: `structured`, `schema_prompt`, or `plain`.
    pub strategy: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/agent", post(run_agent))
        .route("/agent/weather", post(weather))
}

async fn run_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AgentBody>,
) -> std::result::Result<Sse<SseStream>, ApiError> {
    let api_key = state.settings.tavily_api_key.clone().ok_or_else(|| {
        Error::Config("No search tool configured. Set TAVILY_API_KEY.".into())
    })?;

    let model: Arc<dyn ChatModel> =
        Arc::from(state.chat_model(ChatModelOptions::with_temperature(0.0)));
    let search: Arc<dyn Tool> = Arc::new(TavilySearch::new(state.http.clone(), api_key, 1));

    let executor = AgentExecutor::new(model, vec![search]);
    Ok(sse_event_response(executor.run(body.input)))
}

async fn weather(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AgentBody>,
) -> std::result::Result<Sse<SseStream>, ApiError> {
    let model: Arc<dyn ChatModel> =
        Arc::from(state.chat_model(ChatModelOptions::with_temperature(0.0)));
    let strategy = WeatherStrategy::resolve(body.strategy.as_deref(), model.as_ref());

    Ok(sse_event_response(run_weather(model, body.input, strategy)))
}
