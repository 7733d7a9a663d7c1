//! Ragline Core — error taxonomy, provider configuration, shared chat types.

pub mod config;
pub mod error;
pub mod message;

pub use config::{Provider, ProviderConfig, Settings, StoreConfig};
pub use error::{Error, Result};
pub use message::{combine_documents, format_dialogue, format_history, ChatMessage, Document, Role};
