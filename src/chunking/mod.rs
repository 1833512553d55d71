//! Corpus chunking for the retrieval strategy.
//!
//! Splits a corpus into fixed-size, overlapping character windows. Windows
//! prefer to end on a paragraph or line break when one falls in the back half
//! of the window, and fall back to a hard cut at the target length.

use crate::config::ChunkingSettings;
use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};

/// A window of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the sequence.
    pub order: usize,
    /// Offset of the first character, in characters from the corpus start.
    pub offset: usize,
    /// Text content of this chunk.
    pub content: String,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Configuration for chunking. Lengths are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PrepError::InvalidInput("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(PrepError::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits text into overlapping windows.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split `text` into chunks.
    ///
    /// Every chunk is non-empty and at most `chunk_size` characters; each chunk
    /// after the first starts exactly `chunk_overlap` characters before the
    /// previous one ended.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        } = self.config;

        // Byte offset of every char boundary, including the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let end = if total - start <= size {
                total
            } else {
                let hard_end = start + size;
                let min_end = start + (overlap + 1).max(size / 2);
                find_break(text, &bounds, min_end, hard_end).unwrap_or(hard_end)
            };

            chunks.push(Chunk {
                order: chunks.len(),
                offset: start,
                content: text[bounds[start]..bounds[end]].to_string(),
            });

            if end == total {
                break;
            }
            start = end - overlap;
        }

        chunks
    }
}

/// Latest char index in `[min_end, hard_end]` that ends right after a
/// paragraph break, else after a line break.
fn find_break(text: &str, bounds: &[usize], min_end: usize, hard_end: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let ends_with_newline = |i: usize, back: usize| bounds[i] >= back && bytes[bounds[i] - back] == b'\n';

    (min_end..=hard_end)
        .rev()
        .find(|&i| ends_with_newline(i, 1) && ends_with_newline(i, 2))
        .or_else(|| (min_end..=hard_end).rev().find(|&i| ends_with_newline(i, 1)))
}

/// Rebuild the original text from chunks produced with `overlap`.
pub fn reassemble(chunks: &[Chunk], overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(&chunk.content);
        } else {
            out.extend(chunk.content.chars().skip(overlap));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_text() {
        assert!(chunker(10, 2).chunk("").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunker(100, 10).chunk("hello world");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(chunks[0].offset, 0);
    }

    #[test]
    fn test_hard_cut_without_breaks() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunker(10, 3).chunk(text);

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcdefghij", "hijklmnopq", "opqrstuvwx", "vwxyz"]);
        assert_eq!(reassemble(&chunks, 3), text);
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = "aaaaaaaa\nbbbb\n\ncccccccccccccccccccc";
        let chunks = chunker(20, 2).chunk(text);

        assert_eq!(chunks[0].content, "aaaaaaaa\nbbbb\n\n");
        assert_eq!(reassemble(&chunks, 2), text);
    }

    #[test]
    fn test_falls_back_to_line_break() {
        let text = "aaaaaaaaaaaa\nbbbbbbbbbbbbbbbbbbbb";
        let chunks = chunker(20, 2).chunk(text);

        assert_eq!(chunks[0].content, "aaaaaaaaaaaa\n");
        assert_eq!(chunks[1].content.chars().take(2).collect::<String>(), "a\n");
    }

    #[test]
    fn test_ignores_break_too_early_in_window() {
        // Break at char 2 is before the back half of a 20-char window
        let text = "a\n".to_string() + &"x".repeat(40);
        let chunks = chunker(20, 2).chunk(&text);
        assert_eq!(chunks[0].char_len(), 20);
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "héllo wörld ünïcode ✓✓✓ テキスト";
        let chunks = chunker(7, 2).chunk(text);

        assert!(chunks.iter().all(|c| c.char_len() <= 7));
        assert_eq!(reassemble(&chunks, 2), text);
    }

    #[test]
    fn test_invalid_config() {
        assert!(TextChunker::new(ChunkingConfig { chunk_size: 0, chunk_overlap: 0 }).is_err());
        assert!(TextChunker::new(ChunkingConfig { chunk_size: 10, chunk_overlap: 10 }).is_err());
        assert!(TextChunker::new(ChunkingConfig { chunk_size: 10, chunk_overlap: 9 }).is_ok());
    }

    #[test]
    fn test_chunking_is_pure() {
        let text = "line one\nline two\n\nline three\nline four\n".repeat(20);
        let c = chunker(50, 10);
        assert_eq!(c.chunk(&text), c.chunk(&text));
    }

    mod proptest_chunker {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn round_trip_reconstructs_corpus(
                content in "(\\PC|\n){0,3000}",
                chunk_size in 1usize..400,
                overlap_seed in 0usize..400,
            ) {
                let overlap = overlap_seed % chunk_size;
                let c = chunker(chunk_size, overlap);
                let chunks = c.chunk(&content);

                prop_assert_eq!(reassemble(&chunks, overlap), content.clone());
                prop_assert_eq!(chunks.is_empty(), content.is_empty());
            }

            #[test]
            fn chunks_bounded_and_overlap_exact(
                content in "([a-z ]{0,30}\n{0,2}){0,100}",
                chunk_size in 2usize..200,
                overlap_seed in 0usize..200,
            ) {
                let overlap = overlap_seed % chunk_size;
                let chunks = chunker(chunk_size, overlap).chunk(&content);

                for chunk in &chunks {
                    prop_assert!(!chunk.content.is_empty());
                    prop_assert!(chunk.char_len() <= chunk_size);
                }

                for pair in chunks.windows(2) {
                    let prev: Vec<char> = pair[0].content.chars().collect();
                    let next: Vec<char> = pair[1].content.chars().collect();
                    prop_assert_eq!(&prev[prev.len() - overlap..], &next[..overlap]);
                    prop_assert_eq!(pair[1].offset, pair[0].offset + prev.len() - overlap);
                    prop_assert_eq!(pair[1].order, pair[0].order + 1);
                }
            }
        }
    }
}
