//! Retrieval-augmented chat.
//!
//! The condensed standalone question drives similarity search: the
//! question is rewritten against the chat history, embedded, and used to
//! rank the top 3 documents, whose contents become the answer context.
//! Source previews travel back in the `x-sources` header.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use tracing::info;

use ragline_core::{combine_documents, format_dialogue, ChatMessage, Document, Error, Result};
use ragline_embed::Embeddings;
use ragline_llm::{ChatModel, ChatModelOptions, PromptTemplate};

use crate::error::ApiError;
use crate::routes::chat::ChatBody;
use crate::state::AppState;
use crate::stream::{text_stream_response, OutputAdapter};

const RETRIEVAL_K: usize = 3;

const CONDENSE_QUESTION_TEMPLATE: &str = "Given the following conversation and a follow up \
question, rephrase the follow up question to be a standalone question, in its original language.\n\n\
Chat History:\n{chat_history}\n\
Follow Up Input: {question}\n\
Standalone question:";

const ANSWER_TEMPLATE: &str = "Answer the question based only on the following context:\n\
{context}\n\n\
Question: {question}\n\n\
Make sure your answer is helpful and indicates it's based on the information provided.\n";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat/retrieval", post(retrieval_chat))
}

async fn retrieval_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> std::result::Result<Response, ApiError> {
    let (latest, history) = body
        .messages
        .split_last()
        .ok_or_else(|| Error::BadRequest("messages must not be empty".into()))?;
    let question = latest.content.clone();

    let model = state.chat_model(ChatModelOptions::with_temperature(0.2));
    let embeddings = state.embeddings();
    let store = state.store()?;

    let (standalone_question, query_vector) =
        retrieval_query(model.as_ref(), embeddings.as_ref(), history, &question).await?;
    info!("Standalone question for retrieval: {}", standalone_question);

    let documents = store.similarity_search(&query_vector, RETRIEVAL_K).await?;
    info!("Retrieved {} documents", documents.len());

    let context = combine_documents(&documents);
    let answer_prompt = PromptTemplate::new(ANSWER_TEMPLATE)
        .fill(&[("context", &context), ("question", &question)]);

    let adapter = OutputAdapter::for_provider(model.provider());
    let tokens = model.stream(vec![ChatMessage::user(answer_prompt)]);

    let headers = vec![
        (
            HeaderName::from_static("x-message-index"),
            header_value((history.len() + 1).to_string())?,
        ),
        (
            HeaderName::from_static("x-sources"),
            header_value(encode_sources(&documents))?,
        ),
    ];

    Ok(text_stream_response(tokens, adapter, headers))
}

/// Condense the follow-up against the history, then embed the condensed
/// question. The condensed question is what drives similarity search;
/// a lone first question skips the condense round trip.
async fn retrieval_query(
    model: &dyn ChatModel,
    embeddings: &dyn Embeddings,
    history: &[ChatMessage],
    question: &str,
) -> Result<(String, Vec<f32>)> {
    let standalone_question = if history.is_empty() {
        question.to_string()
    } else {
        let prompt = PromptTemplate::new(CONDENSE_QUESTION_TEMPLATE).fill(&[
            ("chat_history", &format_dialogue(history)),
            ("question", question),
        ]);
        model
            .complete(&[ChatMessage::user(prompt)])
            .await?
            .trim()
            .to_string()
    };

    let query_vector = embeddings.embed_query(&standalone_question).await?;
    Ok((standalone_question, query_vector))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|e| Error::Internal(format!("bad header value: {}", e)))
}

/// Base64-encoded JSON array of truncated source snippets.
pub fn encode_sources(documents: &[Document]) -> String {
    let entries: Vec<serde_json::Value> = documents
        .iter()
        .map(|doc| {
            json!({
                "pageContent": format!("{}...", preview(&doc.page_content, 50)),
                "metadata": doc.metadata,
            })
        })
        .collect();
    BASE64.encode(serde_json::to_vec(&entries).unwrap_or_default())
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
