//! Provider abstractions for embeddings, LLM generation and document storage
//!
//! Trait-based so the pipeline can switch between a local Ollama server and
//! an OpenAI-compatible API, and so tests can inject deterministic doubles.

pub mod document_store;
pub mod embedding;
pub mod llm;
pub mod ollama;
pub mod openai;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::Result;

pub use document_store::{DocumentStoreProvider, LocalDocumentStore, StoredDocumentInfo};
pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Embedding and generation capabilities wired from configuration
#[derive(Clone)]
pub struct AiProviders {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn LlmProvider>,
}

impl AiProviders {
    /// Build providers for the configured backend; one HTTP client serves both roles
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match config.effective_backend() {
            LlmBackend::Ollama => {
                let client = Arc::new(OllamaClient::new(config)?);
                Ok(Self {
                    embedder: client.clone(),
                    llm: client,
                })
            }
            LlmBackend::OpenAi => {
                let client = Arc::new(OpenAiClient::new(config)?);
                Ok(Self {
                    embedder: client.clone(),
                    llm: client,
                })
            }
        }
    }
}
