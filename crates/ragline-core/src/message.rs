//! Chat messages, documents, and history formatting helpers.

use serde::{Deserialize, Serialize};

/// Role of a chat message. Wire names match the JSON API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single turn of conversation. Immutable once sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Format as a `"role: content"` line.
    pub fn format_line(&self) -> String {
        format!("{}: {}", self.role.as_str(), self.content)
    }
}

/// Format history as `"role: content"` lines joined by newlines.
pub fn format_history(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(ChatMessage::format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format history as `Human:` / `Assistant:` dialogue turns, the flavor
/// used by the condense-question prompt.
pub fn format_dialogue(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => format!("Human: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
            Role::System => m.format_line(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A retrieved or ingested document. Rows live in the external vector
/// store; this type only carries content and metadata through handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "pageContent")]
    pub page_content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Document {
    pub fn new(page_content: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }
}

/// Join document contents with blank-line separators, preserving order.
pub fn combine_documents(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
