//! Text splitting for ingestion.

pub mod splitter;

pub use splitter::{MarkdownSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
