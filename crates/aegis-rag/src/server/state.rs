//! Application state for the Aegis server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::mail::{Mailer, SmtpMailer};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::providers::{AiProviders, LocalDocumentStore};
use crate::report::{CommandRenderer, ReportRenderer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    /// Knowledge base and conversation
    pipeline: Pipeline,
    /// HTML to PDF renderer
    renderer: Arc<dyn ReportRenderer>,
    /// Email delivery; `None` when SMTP is not configured
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    /// Create application state from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing application state (backend: {:?})...",
            config.llm.effective_backend()
        );

        let providers = AiProviders::from_config(&config.llm)?;
        tracing::info!(
            "AI providers: embeddings via {}, answers via {} ({})",
            providers.embedder.name(),
            providers.llm.name(),
            providers.llm.model()
        );

        let documents = Arc::new(LocalDocumentStore::new(&config.storage.documents_dir)?);
        tracing::info!("Document store at {}", config.storage.documents_dir.display());

        let pipeline =
            Pipeline::open(PipelineOptions::from_config(&config), providers, documents).await?;

        let renderer: Arc<dyn ReportRenderer> = Arc::new(CommandRenderer::from_config(&config.report));

        let mailer: Option<Arc<dyn Mailer>> = match &config.smtp {
            Some(smtp) => Some(Arc::new(SmtpMailer::new(smtp)?)),
            None => {
                tracing::warn!("SMTP is not configured; /send-email will return 503");
                None
            }
        };

        Ok(Self::from_parts(config, pipeline, renderer, mailer))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        config: RagConfig,
        pipeline: Pipeline,
        renderer: Arc<dyn ReportRenderer>,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                renderer,
                mailer,
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    pub fn renderer(&self) -> &Arc<dyn ReportRenderer> {
        &self.inner.renderer
    }

    pub fn mailer(&self) -> Option<&Arc<dyn Mailer>> {
        self.inner.mailer.as_ref()
    }

    /// Whether questions can be answered
    pub fn is_ready(&self) -> bool {
        self.inner.pipeline.is_ready()
    }
}
