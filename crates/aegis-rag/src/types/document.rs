//! Document and chunk types with source tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// An uploaded source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// File name as stored (sanitized upload name)
    pub filename: String,
    /// Location of the raw bytes in the document store
    pub storage_path: PathBuf,
    /// SHA-256 of the raw bytes
    pub content_hash: String,
    /// Size in bytes
    pub file_size: u64,
    /// Page count reported by the PDF
    pub total_pages: Option<u32>,
    /// Number of chunks indexed for this document
    pub total_chunks: u32,
    /// When the document was stored
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(filename: String, storage_path: PathBuf, content_hash: String, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            storage_path,
            content_hash,
            file_size,
            total_pages: None,
            total_chunks: 0,
            uploaded_at: Utc::now(),
        }
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Source file name
    pub filename: String,
    /// Total pages in the source document
    pub page_count: Option<u32>,
}

impl ChunkSource {
    /// Create source info for a PDF
    pub fn pdf(filename: String, page_count: Option<u32>) -> Self {
        Self { filename, page_count }
    }

    /// Format source for display in prompts
    pub fn format_citation(&self, position: u32) -> String {
        match self.page_count {
            Some(pages) => format!("{} (part {}, {} pages)", self.filename, position + 1, pages),
            None => format!("{} (part {})", self.filename, position + 1),
        }
    }
}

/// A contiguous span of extracted text from one document
///
/// Serialized into the persisted vector index, so every field must survive
/// a non-self-describing format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Source information
    pub source: ChunkSource,
    /// Character span in the extracted text, `[char_start, char_end)`
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within its document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        document_id: Uuid,
        content: String,
        source: ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            source,
            char_start,
            char_end,
            chunk_index,
        }
    }
}
