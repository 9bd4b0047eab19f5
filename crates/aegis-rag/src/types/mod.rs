//! Core types for the Aegis backend

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkSource, Document};
pub use query::{QueryRequest, ReportRequest};
pub use response::{
    DocumentListResponse, DocumentSummary, MessageResponse, PdfBase64Response, QueryResponse,
    SourceRef, StatusResponse, UploadResponse,
};
