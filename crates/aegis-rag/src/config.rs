//! Configuration for the Aegis backend
//!
//! Every section has defaults. A TOML file (path from `AEGIS_CONFIG`) may
//! override them, and environment variables override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Persisted state locations
    pub storage: StorageConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Ingestion time budget
    pub processing: ProcessingConfig,
    /// Embedding / generation backend
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Conversation session policy
    pub session: SessionConfig,
    /// HTML to PDF renderer
    pub report: ReportConfig,
    /// SMTP configuration (email is disabled when absent)
    pub smtp: Option<SmtpConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Locations of uploaded documents and the persisted vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding raw uploaded files by name
    pub documents_dir: PathBuf,
    /// Directory holding the serialized vector index
    pub vector_store_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aegis-rag");

        Self {
            documents_dir: base.join("documents_storage"),
            vector_store_path: base.join("vector_store").join("aegis_index"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared by adjacent chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Timeout for ingesting a single file in seconds (default: 300 = 5 minutes)
    pub file_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            file_timeout_secs: 300,
        }
    }
}

/// Which HTTP API serves embeddings and generation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI or any API speaking its embeddings / chat completions dialect
    OpenAi,
}

impl std::str::FromStr for LlmBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::Config(format!("Unknown LLM backend: {}", other))),
        }
    }
}

/// Embedding and generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend selection; `None` picks OpenAI when an API key is present
    pub backend: Option<LlmBackend>,
    /// Ollama base URL
    pub ollama_url: String,
    /// OpenAI-compatible base URL
    pub openai_url: String,
    /// OpenAI API key
    pub api_key: Option<String>,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed HTTP requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: None,
            ollama_url: "http://localhost:11434".to_string(),
            openai_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

impl LlmConfig {
    /// Backend actually in use
    pub fn effective_backend(&self) -> LlmBackend {
        match self.backend {
            Some(backend) => backend,
            None if self.api_key.is_some() => LlmBackend::OpenAi,
            None => LlmBackend::Ollama,
        }
    }

    /// Per-request time budget
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the generator
    pub top_k: usize,
    /// Rewrite follow-up questions into standalone ones before retrieval
    pub condense_question: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            condense_question: false,
        }
    }
}

/// Conversation session policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Clear the conversation after every successful ingestion
    pub reset_on_ingest: bool,
    /// Oldest turns are dropped beyond this many (0 = unbounded)
    pub max_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_on_ingest: true,
            max_turns: 0,
        }
    }
}

/// External HTML to PDF command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Program reading HTML on stdin and writing PDF on stdout
    pub command: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Rendering timeout in seconds
    pub timeout_secs: u64,
    /// Attachment file name for rendered reports
    pub filename: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            command: "wkhtmltopdf".to_string(),
            args: vec!["--quiet".to_string(), "-".to_string(), "-".to_string()],
            timeout_secs: 60,
            filename: "report.pdf".to_string(),
        }
    }
}

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,
    /// SMTP port (STARTTLS)
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Login user, also used as the sender address
    pub username: String,
    /// Login password
    pub password: String,
    /// Delivery timeout in seconds
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout() -> u64 {
    30
}

impl RagConfig {
    /// Load configuration: defaults, then the TOML file named by
    /// `AEGIS_CONFIG` (if any), then environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("AEGIS_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("AEGIS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("AEGIS_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid AEGIS_PORT: {}", port)))?;
        }
        if let Some(dir) = lookup("AEGIS_DOCUMENTS_DIR") {
            self.storage.documents_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("AEGIS_VECTOR_STORE_PATH") {
            self.storage.vector_store_path = PathBuf::from(path);
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(backend) = lookup("AEGIS_LLM_BACKEND") {
            self.llm.backend = Some(backend.parse()?);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.llm.ollama_url = url;
        }
        if let Some(command) = lookup("AEGIS_PDF_RENDERER") {
            self.report.command = command;
        }

        if let Some(host) = lookup("SMTP_SERVER") {
            let port = match lookup("SMTP_PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid SMTP_PORT: {}", port)))?,
                None => default_smtp_port(),
            };
            self.smtp = Some(SmtpConfig {
                host,
                port,
                username: lookup("SMTP_USER").unwrap_or_default(),
                password: lookup("SMTP_PASSWORD").unwrap_or_default(),
                timeout_secs: default_smtp_timeout(),
            });
        }

        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("top_k must be positive".to_string()));
        }
        if self.llm.effective_backend() == LlmBackend::OpenAi && self.llm.api_key.is_none() {
            return Err(Error::Config("OpenAI backend requires OPENAI_API_KEY".to_string()));
        }
        Ok(())
    }
}
