//! Structured output: fixed extraction schema, single non-streaming call.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use ragline_core::{ChatMessage, Error};
use ragline_llm::{ChatModelOptions, PromptTemplate};

use crate::error::ApiError;
use crate::routes::chat::ChatBody;
use crate::state::AppState;

const EXTRACT_TEMPLATE: &str = "Extract the requested fields from the input.\n\n\
The field \"entity\" refers to the first mentioned entity in the input.\n\n\
Input:\n\n{input}";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat/structured_output", post(structured_output))
}

/// The fixed output schema bound to the model.
pub fn output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "description": "Should always be used to properly format output",
        "properties": {
            "tone": {
                "type": "string",
                "enum": ["positive", "negative", "neutral"],
                "description": "The overall tone of the input",
            },
            "entity": {
                "type": "string",
                "description": "The entity mentioned in the input",
            },
            "word_count": {
                "type": "number",
                "description": "The number of words in the input",
            },
            "chat_response": {
                "type": "string",
                "description": "A response to the human's input",
            },
            "final_punctuation": {
                "type": "string",
                "description": "The final punctuation mark in the input, if any.",
            },
        },
        "required": ["tone", "entity", "word_count", "chat_response"],
    })
}

async fn structured_output(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let latest = body
        .messages
        .last()
        .ok_or_else(|| Error::BadRequest("messages must not be empty".into()))?;

    let prompt = PromptTemplate::new(EXTRACT_TEMPLATE).fill(&[("input", &latest.content)]);

    let model = state.chat_model(ChatModelOptions::with_temperature(0.8));
    let result = model
        .structured(
            &[ChatMessage::user(prompt)],
            &output_schema(),
            "output_formatter",
        )
        .await?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_shape() {
        let schema = output_schema();
        let tones: Vec<&str> = schema["properties"]["tone"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(tones, vec!["positive", "negative", "neutral"]);

        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "word_count"));
        assert!(required.iter().any(|v| v == "chat_response"));
        // final_punctuation stays optional.
        assert!(!required.iter().any(|v| v == "final_punctuation"));
    }

    #[test]
    fn test_canned_provider_payload_matches_schema() {
        // Shape a provider would return for "I love sunny days in Texas!".
        let payload = json!({
            "tone": "positive",
            "entity": "sunny days",
            "word_count": 6,
            "chat_response": "Sunny days in Texas are wonderful!",
            "final_punctuation": "!",
        });
        let schema = output_schema();
        for field in schema["required"].as_array().unwrap() {
            assert!(
                payload.get(field.as_str().unwrap()).is_some(),
                "missing required field {}",
                field
            );
        }
        assert!(["positive", "negative", "neutral"]
            .contains(&payload["tone"].as_str().unwrap()));
        assert_eq!(
            payload["word_count"].as_u64().unwrap(),
            "I love sunny days in Texas!".split_whitespace().count() as u64
        );
        assert!(!payload["chat_response"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_extract_template_fills_input() {
        let prompt =
            PromptTemplate::new(EXTRACT_TEMPLATE).fill(&[("input", "I love sunny days!")]);
        assert!(prompt.ends_with("Input:\n\nI love sunny days!"));
    }
}
