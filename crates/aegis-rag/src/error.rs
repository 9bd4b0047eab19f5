//! Error types for the Aegis backend

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline and server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aegis errors
#[derive(Debug, Error)]
pub enum Error {
    /// No knowledge base exists yet
    #[error("The system is not ready. Upload a document first.")]
    NotReady,

    /// Embedding capability failed or was unreachable
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Answer generation failed
    #[error("Answer generation failed: {0}")]
    Generation(String),

    /// Persisted index could not be decoded
    #[error("Vector index is corrupt: {0}")]
    CorruptIndex(String),

    /// Search against an index with no entries
    #[error("Vector index has no entries")]
    EmptyIndex,

    /// Document extraction or chunking failed
    #[error("Ingestion failed for '{filename}': {message}")]
    Ingestion { filename: String, message: String },

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// HTML to PDF rendering failed
    #[error("Report rendering failed: {0}")]
    Report(String),

    /// Email composition or delivery failed
    #[error("Email delivery failed: {0}")]
    Email(String),

    /// A collaborator is disabled because it has no configuration
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Malformed client request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External call exceeded its time budget
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an ingestion error
    pub fn ingestion(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingestion {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a corrupt index error
    pub fn corrupt_index(message: impl Into<String>) -> Self {
        Self::CorruptIndex(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            Error::NotReady => (StatusCode::BAD_REQUEST, "not_ready"),
            Error::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error"),
            Error::Generation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "generation_error"),
            Error::CorruptIndex(_) => (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_index"),
            Error::EmptyIndex => (StatusCode::INTERNAL_SERVER_ERROR, "empty_index"),
            Error::Ingestion { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "ingestion_error"),
            Error::FileParse { .. } => (StatusCode::BAD_REQUEST, "parse_error"),
            Error::Report(_) => (StatusCode::INTERNAL_SERVER_ERROR, "report_error"),
            Error::Email(_) => (StatusCode::INTERNAL_SERVER_ERROR, "email_error"),
            Error::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        self.kind().0
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.kind();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::NotReady.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::generation("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::NotConfigured("SMTP").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_ingestion_message_names_file() {
        let err = Error::ingestion("report.pdf", "no text");
        assert_eq!(err.to_string(), "Ingestion failed for 'report.pdf': no text");
    }
}
