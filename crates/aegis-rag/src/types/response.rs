//! Response bodies

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineState;
use crate::retrieval::ScoredChunk;

/// Result of `POST /upload-document`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub filename: String,
    pub message: String,
    /// Chunks added to the knowledge base
    pub chunks: usize,
}

impl UploadResponse {
    pub fn success(filename: String, chunks: usize) -> Self {
        Self {
            status: "success".to_string(),
            filename,
            message: "Knowledge base updated.".to_string(),
            chunks,
        }
    }
}

/// A retrieved chunk that informed an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
    pub chunk_index: u32,
    pub similarity: f32,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            filename: scored.chunk.source.filename.clone(),
            chunk_index: scored.chunk.chunk_index,
            similarity: scored.similarity,
        }
    }
}

/// Result of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// Result of `POST /generate-pdf`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfBase64Response {
    pub status: String,
    pub pdf_content_base64: String,
}

/// Generic `{status, message}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Pipeline status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub state: PipelineState,
    pub indexed_chunks: usize,
    pub documents: usize,
    pub conversation_turns: usize,
}

/// Stored document listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    /// Size of the stored file in bytes
    pub size: u64,
    /// Chunks from this file present in the index
    pub indexed_chunks: usize,
}

/// Result of `GET /documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: usize,
}
