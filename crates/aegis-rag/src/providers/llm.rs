//! LLM provider trait for answer generation

use async_trait::async_trait;
use crate::error::Result;

/// Trait for text generation from a fully composed prompt
///
/// Implementations:
/// - `OllamaClient`: local Ollama server
/// - `OpenAiClient`: OpenAI-compatible chat completions
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
