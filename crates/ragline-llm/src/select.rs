//! Deterministic chat model selection.
//!
//! The provider decision is already baked into [`ProviderConfig`]; this
//! module maps it to a concrete client with the documented default model
//! names. Same config, same options ⇒ same provider class and model.

use reqwest::Client;
use tracing::info;

use ragline_core::{Provider, ProviderConfig};

use crate::gemini::GeminiChat;
use crate::model::ChatModel;
use crate::openai::OpenAiChat;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Sampling and model overrides for a chat model instance.
#[derive(Debug, Clone)]
pub struct ChatModelOptions {
    pub temperature: f64,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

impl Default for ChatModelOptions {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            model: None,
            max_tokens: None,
        }
    }
}

impl ChatModelOptions {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature,
            ..Default::default()
        }
    }
}

/// Build the chat model for the configured provider.
pub fn select_chat_model(
    client: &Client,
    config: &ProviderConfig,
    options: ChatModelOptions,
) -> Box<dyn ChatModel> {
    match config.provider {
        Provider::Google => {
            let model = options
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
            info!("Using Gemini chat model {}", model);
            Box::new(GeminiChat::new(
                client.clone(),
                config.api_key.clone(),
                model,
                options.temperature,
                options.max_tokens,
            ))
        }
        Provider::OpenAi => {
            let model = options
                .model
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            info!("Using OpenAI chat model {}", model);
            Box::new(OpenAiChat::new(
                client.clone(),
                config.api_key.clone(),
                model,
                options.temperature,
                options.max_tokens,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: Provider) -> ProviderConfig {
        ProviderConfig {
            provider,
            api_key: "test-key".into(),
        }
    }

    #[test]
    fn test_google_selects_gemini_default() {
        let model = select_chat_model(
            &Client::new(),
            &config(Provider::Google),
            ChatModelOptions::default(),
        );
        assert_eq!(model.provider(), Provider::Google);
        assert_eq!(model.model_name(), DEFAULT_GEMINI_MODEL);
        assert!(!model.supports_native_tools());
    }

    #[test]
    fn test_openai_selects_openai_default() {
        let model = select_chat_model(
            &Client::new(),
            &config(Provider::OpenAi),
            ChatModelOptions::default(),
        );
        assert_eq!(model.provider(), Provider::OpenAi);
        assert_eq!(model.model_name(), DEFAULT_OPENAI_MODEL);
        assert!(model.supports_native_tools());
    }

    #[test]
    fn test_default_model_names_differ() {
        assert_ne!(DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_model_override_respected() {
        let model = select_chat_model(
            &Client::new(),
            &config(Provider::OpenAi),
            ChatModelOptions {
                model: Some("gpt-4o".into()),
                ..Default::default()
            },
        );
        assert_eq!(model.model_name(), "gpt-4o");
    }
}
