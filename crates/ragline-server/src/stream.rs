//! Streaming response adapters.
//!
//! Token streams become chunked plain-text bodies; agent event streams
//! become SSE. The output adapter mirrors the provider split: Gemini
//! streams pass through as text, OpenAI streams go through the byte
//! encoder. Errors after streaming has begun surface as a final marker
//! chunk, since the status line is already gone.

use std::convert::Infallible;
use std::pin::Pin;

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::Response;
use futures::Stream;
use tokio_stream::StreamExt;

use ragline_agent::EventStream;
use ragline_core::Provider;
use ragline_llm::{StreamChunk, TokenStream};

pub type SseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

/// How streamed tokens are encoded onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAdapter {
    /// Pass tokens through as text.
    PlainText,
    /// Encode tokens as raw bytes.
    Bytes,
}

impl OutputAdapter {
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Google => OutputAdapter::PlainText,
            Provider::OpenAi => OutputAdapter::Bytes,
        }
    }

    fn encode(&self, text: String) -> Bytes {
        match self {
            OutputAdapter::PlainText => Bytes::from(text),
            OutputAdapter::Bytes => Bytes::from(text.into_bytes()),
        }
    }
}

/// Build a chunked plain-text response from a token stream.
pub fn text_stream_response(
    tokens: TokenStream,
    adapter: OutputAdapter,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
) -> Response {
    let body_stream = tokens.filter_map(move |chunk| match chunk {
        StreamChunk::Token(text) => Some(Ok::<_, Infallible>(adapter.encode(text))),
        StreamChunk::Done => None,
        StreamChunk::Error(e) => Some(Ok(Bytes::from(format!("\n[stream error] {}", e)))),
    });

    let mut response = Response::new(Body::from_stream(body_stream));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    for (name, value) in extra_headers {
        response.headers_mut().insert(name, value);
    }
    response
}

/// Serialize every agent event verbatim onto an SSE stream.
pub fn sse_event_response(events: EventStream) -> Sse<SseStream> {
    let stream: SseStream = Box::pin(events.map(|event| {
        Ok(Event::default().data(
            serde_json::to_string(&event)
                .unwrap_or_else(|e| format!("{{\"event\":\"error\",\"error\":\"{}\"}}", e)),
        ))
    }));
    Sse::new(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_text_stream_concatenates_tokens() {
        let tokens: TokenStream = Box::pin(stream::iter(vec![
            StreamChunk::Token("Hello ".into()),
            StreamChunk::Token("world".into()),
            StreamChunk::Done,
        ]));
        let response =
            text_stream_response(tokens, OutputAdapter::PlainText, Vec::new());
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Hello world");
    }

    #[tokio::test]
    async fn test_mid_stream_error_becomes_marker_chunk() {
        let tokens: TokenStream = Box::pin(stream::iter(vec![
            StreamChunk::Token("partial".into()),
            StreamChunk::Error("upstream died".into()),
        ]));
        let response = text_stream_response(tokens, OutputAdapter::Bytes, Vec::new());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("partial"));
        assert!(text.contains("[stream error] upstream died"));
    }

    #[test]
    fn test_adapter_by_provider() {
        assert_eq!(
            OutputAdapter::for_provider(Provider::Google),
            OutputAdapter::PlainText
        );
        assert_eq!(
            OutputAdapter::for_provider(Provider::OpenAi),
            OutputAdapter::Bytes
        );
    }
}
