//! HTML to PDF conversion through an external renderer process

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ReportConfig;
use crate::error::{Error, Result};

/// Trait for HTML to PDF rendering
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Render an HTML document to PDF bytes
    async fn render(&self, html: &str) -> Result<Vec<u8>>;

    /// Get renderer name for logging
    fn name(&self) -> &str;
}

/// Renderer that pipes HTML into a command and reads the PDF from its stdout
///
/// The default command is `wkhtmltopdf --quiet - -`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn run(&self, html: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Report(format!("failed to start {}: {}", self.command, e)))?;

        // Feed stdin concurrently so a renderer that streams output early
        // cannot deadlock on a full pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Report("renderer stdin unavailable".to_string()))?;
        let input = html.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Report(format!("{} failed: {}", self.command, e)))?;

        if let Ok(Err(e)) = writer.await {
            tracing::debug!("Renderer closed stdin early: {}", e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Report(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        if !output.stdout.starts_with(b"%PDF") {
            return Err(Error::Report(format!(
                "{} did not produce a PDF document",
                self.command
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl ReportRenderer for CommandRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let pdf = tokio::time::timeout(self.timeout, self.run(html))
            .await
            .map_err(|_| Error::Timeout {
                operation: "report rendering",
                secs: self.timeout.as_secs(),
            })??;

        tracing::info!("Rendered report ({} bytes of HTML -> {} bytes of PDF)", html.len(), pdf.len());
        Ok(pdf)
    }

    fn name(&self) -> &str {
        &self.command
    }
}
