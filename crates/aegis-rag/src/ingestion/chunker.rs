//! Fixed-size overlapping text chunking

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, Document};

/// A window of text, positioned in characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan<'a> {
    pub text: &'a str,
    pub char_start: usize,
    pub char_end: usize,
}

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk length in characters
    chunk_size: usize,
    /// Characters shared by adjacent chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(Error::Config(format!(
                "invalid chunking parameters: size {} overlap {}",
                chunk_size, overlap
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into windows of at most `chunk_size` characters, each
    /// starting `chunk_size - overlap` characters after the previous one.
    /// The last window is the first that reaches the end of the text.
    pub fn split<'a>(&self, text: &'a str) -> Vec<TextSpan<'a>> {
        let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total = offsets.len();
        let step = self.chunk_size - self.overlap;

        let mut spans = Vec::new();
        let mut start = 0usize;

        while start < total {
            let end = (start + self.chunk_size).min(total);
            let byte_end = if end == total { text.len() } else { offsets[end] };

            spans.push(TextSpan {
                text: &text[offsets[start]..byte_end],
                char_start: start,
                char_end: end,
            });

            if end == total {
                break;
            }
            start += step;
        }

        spans
    }

    /// Chunk the extracted text of one document
    pub fn chunk_document(&self, doc: &Document, text: &str) -> Vec<Chunk> {
        let source = ChunkSource::pdf(doc.filename.clone(), doc.total_pages);

        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                Chunk::new(
                    doc.id,
                    span.text.to_string(),
                    source.clone(),
                    span.char_start,
                    span.char_end,
                    i as u32,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn reconstruct(spans: &[TextSpan<'_>], overlap: usize) -> String {
        let mut out = String::new();
        for (i, span) in spans.iter().enumerate() {
            if i == 0 {
                out.push_str(span.text);
            } else {
                out.extend(span.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let chunker = TextChunker::new(20, 5).unwrap();
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(10, 12).is_err());
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(10, 0).is_ok());
    }

    #[test]
    fn test_sky_example() {
        let chunker = TextChunker::new(20, 5).unwrap();
        let text = "The sky is blue. Grass is green.";
        let spans = chunker.split(text);

        assert!(spans.len() >= 2);
        for span in &spans {
            assert!(span.text.chars().count() <= 20);
        }
        for pair in spans.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let suffix: String = prev[prev.len() - 5..].iter().collect();
            let prefix: String = pair[1].text.chars().take(5).collect();
            assert_eq!(suffix, prefix);
        }
        assert_eq!(spans[0].text, "The sky is blue. Gra");
        assert_eq!(reconstruct(&spans, 5), text);
    }

    #[test]
    fn test_reconstruction_and_bounds() {
        let samples = [
            "a",
            "short",
            "exactly twenty chars",
            "The quick brown fox jumps over the lazy dog, again and again and again.",
            "caffè, naïve façade — 東京 では 雨 が 降って います。",
        ];

        for (size, overlap) in [(20, 5), (7, 3), (5, 0), (2, 1)] {
            let chunker = TextChunker::new(size, overlap).unwrap();
            for text in samples {
                let spans = chunker.split(text);
                assert!(!spans.is_empty());
                assert_eq!(reconstruct(&spans, overlap), text, "size {} overlap {}", size, overlap);
                for span in &spans {
                    let len = span.text.chars().count();
                    assert!(len <= size);
                    assert_eq!(len, span.char_end - span.char_start);
                }
                assert_eq!(spans.last().unwrap().char_end, text.chars().count());
            }
        }
    }

    #[test]
    fn test_text_shorter_than_chunk() {
        let chunker = TextChunker::new(100, 10).unwrap();
        let spans = chunker.split("tiny");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "tiny");
    }

    #[test]
    fn test_chunk_document_positions() {
        let chunker = TextChunker::new(20, 5).unwrap();
        let mut doc = Document::new(
            "sky.pdf".to_string(),
            PathBuf::from("/tmp/sky.pdf"),
            "hash".to_string(),
            10,
        );
        doc.total_pages = Some(1);

        let chunks = chunker.chunk_document(&doc, "The sky is blue. Grass is green.");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[1].char_start, 15);
        assert!(chunks.iter().all(|c| c.document_id == doc.id));
        assert_eq!(chunks[0].source.filename, "sky.pdf");
    }
}
