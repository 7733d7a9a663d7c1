//! Plain chat: prompt template over history, streamed answer.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use ragline_core::{format_history, ChatMessage, Error, Result};
use ragline_llm::{ChatModelOptions, PromptTemplate};

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::{text_stream_response, OutputAdapter};

const CHAT_TEMPLATE: &str = "You are a helpful assistant.\n\n\
Current conversation:\n{chat_history}\n\n\
User: {input}\nAI:";

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Fill the chat template: prior turns as `"role: content"` lines, then
/// the latest message as the input.
pub fn build_chat_prompt(messages: &[ChatMessage]) -> Result<String> {
    let (input, history) = messages
        .split_last()
        .ok_or_else(|| Error::BadRequest("messages must not be empty".into()))?;

    Ok(PromptTemplate::new(CHAT_TEMPLATE).fill(&[
        ("chat_history", &format_history(history)),
        ("input", &input.content),
    ]))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> std::result::Result<Response, ApiError> {
    let prompt = build_chat_prompt(&body.messages)?;

    let model = state.chat_model(ChatModelOptions::with_temperature(0.8));
    let adapter = OutputAdapter::for_provider(model.provider());
    let tokens = model.stream(vec![ChatMessage::user(prompt)]);

    Ok(text_stream_response(tokens, adapter, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_history_before_user_marker() {
        let messages = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello"),
            ChatMessage::user("How are you?"),
        ];
        let prompt = build_chat_prompt(&messages).unwrap();

        let history_pos = prompt.find("user: Hi").unwrap();
        assert!(prompt.contains("assistant: Hello"));
        let user_marker = prompt.rfind("User: How are you?").unwrap();
        assert!(history_pos < user_marker);
        assert!(prompt.ends_with("AI:"));
    }

    #[test]
    fn test_empty_messages_rejected() {
        let err = build_chat_prompt(&[]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_single_message_has_empty_history() {
        let prompt = build_chat_prompt(&[ChatMessage::user("Hey")]).unwrap();
        assert!(prompt.contains("Current conversation:\n\n"));
        assert!(prompt.contains("User: Hey"));
    }
}
