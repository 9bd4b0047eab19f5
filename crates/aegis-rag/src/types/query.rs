//! Request bodies

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Question for the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

impl QueryRequest {
    /// Reject blank questions
    pub fn validate(&self) -> Result<&str> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(Error::InvalidRequest("question must not be empty".to_string()));
        }
        Ok(question)
    }
}

/// HTML report to render as PDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Complete HTML document
    pub html_content: String,
}
