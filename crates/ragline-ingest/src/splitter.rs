//! Markdown-aware recursive character splitting.
//!
//! Splits on markdown structure first (headings, fenced code, paragraphs)
//! and falls back through sentences, words, and finally character windows.
//! Adjacent chunks share up to `chunk_overlap` characters of trailing
//! context from the previous chunk.

/// Target chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 256;
/// Overlap carried between adjacent chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 20;

/// Separators ordered from coarsest (markdown structure) to finest.
/// The empty separator is the character-window fallback.
const MARKDOWN_SEPARATORS: &[&str] = &[
    "\n## ", "\n### ", "\n#### ", "```\n", "\n\n", "\n", ". ", " ", "",
];

pub struct MarkdownSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl MarkdownSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(chunk_overlap < chunk_size, "overlap must be below chunk size");
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split text into chunks of at most `chunk_size` characters.
    /// Empty or whitespace-only input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, MARKDOWN_SEPARATORS)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let separator = separators.first().copied().unwrap_or("");
        let remaining = separators.get(1..).unwrap_or(&[]);

        if separator.is_empty() {
            return self.char_windows(text);
        }

        let pieces: Vec<&str> = text.split(separator).collect();
        self.merge_pieces(&pieces, separator, remaining)
    }

    /// Merge split pieces back into chunks near the target size, carrying
    /// trailing pieces within the overlap budget into the next chunk.
    fn merge_pieces(&self, pieces: &[&str], separator: &str, remaining: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0usize;

        for &piece in pieces {
            let piece_len = piece.len() + separator.len();

            if piece.len() > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(current.join(separator));
                    current.clear();
                    current_len = 0;
                }
                chunks.extend(self.split_recursive(piece, remaining));
                continue;
            }

            if current_len + piece_len > self.chunk_size && !current.is_empty() {
                chunks.push(current.join(separator));
                // Retain only the overlap tail for the next chunk.
                while !current.is_empty()
                    && (current_len > self.chunk_overlap
                        || current_len + piece_len > self.chunk_size)
                {
                    let dropped = current.remove(0);
                    current_len -= dropped.len() + separator.len();
                }
            }

            current.push(piece);
            current_len += piece_len;
        }

        if !current.is_empty() {
            chunks.push(current.join(separator));
        }

        chunks
    }

    /// Character-window fallback for text with no usable separators.
    fn char_windows(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

impl Default for MarkdownSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}
