//! Persona chat: fixed system persona over the raw conversation,
//! streamed reply. Unlike plain chat there is no history/input split —
//! the message list is passed to the model as-is behind the persona.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};

use ragline_core::{ChatMessage, Error, Result};
use ragline_llm::ChatModelOptions;

use crate::error::ApiError;
use crate::routes::chat::ChatBody;
use crate::state::AppState;
use crate::stream::{text_stream_response, OutputAdapter};

const PERSONA_PROMPT: &str = "You are a pirate named Patchy. \
All responses must be extremely verbose and in pirate dialect.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat/agent", post(persona_chat))
}

/// Prepend the persona system message, keeping the conversation intact.
pub fn build_persona_messages(messages: &[ChatMessage]) -> Result<Vec<ChatMessage>> {
    if messages.is_empty() {
        return Err(Error::BadRequest("messages must not be empty".into()));
    }
    let mut prompted = Vec::with_capacity(messages.len() + 1);
    prompted.push(ChatMessage::system(PERSONA_PROMPT));
    prompted.extend_from_slice(messages);
    Ok(prompted)
}

async fn persona_chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> std::result::Result<Response, ApiError> {
    let messages = build_persona_messages(&body.messages)?;

    let model = state.chat_model(ChatModelOptions::with_temperature(0.0));
    let adapter = OutputAdapter::for_provider(model.provider());
    let tokens = model.stream(messages);

    Ok(text_stream_response(tokens, adapter, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_core::Role;

    #[test]
    fn test_persona_system_message_comes_first() {
        let messages = vec![
            ChatMessage::user("Ahoy"),
            ChatMessage::assistant("Ahoy yerself!"),
            ChatMessage::user("Where be the treasure?"),
        ];
        let prompted = build_persona_messages(&messages).unwrap();

        assert_eq!(prompted.len(), 4);
        assert_eq!(prompted[0].role, Role::System);
        assert!(prompted[0].content.contains("pirate named Patchy"));
        assert!(prompted[0].content.contains("pirate dialect"));
        // Conversation order is untouched behind the persona.
        assert_eq!(prompted[1].content, "Ahoy");
        assert_eq!(prompted[2].content, "Ahoy yerself!");
        assert_eq!(prompted[3].content, "Where be the treasure?");
    }

    #[test]
    fn test_empty_messages_rejected() {
        let err = build_persona_messages(&[]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
