//! aegis-rag: question answering over uploaded PDF documents
//!
//! Uploaded PDFs are stored, split into overlapping character windows,
//! embedded and kept in a persisted vector index. Questions are answered by
//! retrieving the nearest chunks and prompting a language model together
//! with the running conversation. The server also renders HTML reports to
//! PDF and emails them.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod mail;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{Answer, IngestOutcome, Pipeline, PipelineOptions, PipelineState};
pub use types::{
    document::{Chunk, ChunkSource, Document},
    query::QueryRequest,
    response::{QueryResponse, SourceRef},
};
