//! Chat model clients for hosted LLM providers (Gemini, OpenAI).
//!
//! Everything speaks through the [`ChatModel`] trait: one-shot completion,
//! token streaming, structured output, and tool-calling turns. Providers
//! are selected deterministically from a [`ragline_core::ProviderConfig`].

pub mod gemini;
pub mod model;
pub mod openai;
pub mod prompt;
pub mod select;

pub use gemini::GeminiChat;
pub use model::{parse_json_block, ChatModel, StreamChunk, TokenStream, ToolCall, ToolSpec, ToolTurn};
pub use openai::OpenAiChat;
pub use prompt::PromptTemplate;
pub use select::{select_chat_model, ChatModelOptions, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
