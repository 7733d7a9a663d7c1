//! Agent execution events, streamed verbatim to the client.

use std::pin::Pin;

use futures::Stream;
use serde::Serialize;

/// One intermediate execution event. Serialized as-is — no filtering or
/// redaction between the executor and the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    ChainStart {
        input: String,
    },
    ModelStream {
        content: String,
    },
    ToolStart {
        name: String,
        arguments: serde_json::Value,
    },
    ToolEnd {
        name: String,
        output: String,
    },
    ChainEnd {
        output: String,
    },
    Error {
        error: String,
    },
}

/// Boxed stream of agent events.
pub type EventStream = Pin<Box<dyn Stream<Item = AgentEvent> + Send>>;
