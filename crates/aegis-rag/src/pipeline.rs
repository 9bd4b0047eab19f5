//! Knowledge-base orchestrator: document ingestion and conversational answers
//!
//! The pipeline owns the current vector index snapshot and the conversation
//! session. Queries read an immutable `Arc<VectorIndex>` snapshot; ingestions
//! are serialised, build a new index off to the side, persist it, and only
//! then swap it in. A query racing an ingestion therefore sees either the
//! old or the new index, never a partial one.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{ConversationSession, PromptBuilder, Turn};
use crate::ingestion::{parser::hash_content, PdfExtractor, TextChunker};
use crate::providers::document_store::sanitize_filename;
use crate::providers::{AiProviders, DocumentStoreProvider, EmbeddingProvider, LlmProvider};
use crate::retrieval::{ScoredChunk, VectorIndex};
use crate::types::{Document, StatusResponse};

/// Lifecycle of the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// No index yet; questions fail with `NotReady`
    Uninitialized,
    /// Index present, questions are answered
    Ready,
}

/// Tunables taken from `RagConfig`
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub condense_question: bool,
    pub reset_on_ingest: bool,
    pub max_turns: usize,
    /// Directory of the persisted index
    pub vector_store_path: PathBuf,
    /// Budget for each embedding / generation call
    pub request_timeout: Duration,
    /// Budget for ingesting one file end to end
    pub file_timeout: Duration,
}

impl PipelineOptions {
    pub fn from_config(config: &RagConfig) -> Self {
        Self {
            chunk_size: config.chunking.chunk_size,
            chunk_overlap: config.chunking.chunk_overlap,
            top_k: config.retrieval.top_k,
            condense_question: config.retrieval.condense_question,
            reset_on_ingest: config.session.reset_on_ingest,
            max_turns: config.session.max_turns,
            vector_store_path: config.storage.vector_store_path.clone(),
            request_timeout: config.llm.timeout(),
            file_timeout: Duration::from_secs(config.processing.file_timeout_secs),
        }
    }
}

/// Answer to one question
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    /// Retrieved chunks, nearest first
    pub sources: Vec<ScoredChunk>,
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub document: Document,
    pub chunks: usize,
}

type IndexSlot = Arc<RwLock<Option<Arc<VectorIndex>>>>;

/// Run `fut` until `deadline`, turning an elapsed budget into `on_timeout()`
async fn within<T, F>(deadline: Instant, fut: F, on_timeout: impl FnOnce() -> Error) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}

/// Pipeline orchestrator
pub struct Pipeline {
    options: PipelineOptions,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    documents: Arc<dyn DocumentStoreProvider>,
    /// Current index snapshot; `None` while uninitialized
    index: IndexSlot,
    /// Serialises ingestions from snapshot to swap
    ingest_lock: Arc<tokio::sync::Mutex<()>>,
    session: Arc<Mutex<ConversationSession>>,
}

impl Pipeline {
    /// Create the pipeline, loading a persisted index if one exists
    pub async fn open(
        options: PipelineOptions,
        providers: AiProviders,
        documents: Arc<dyn DocumentStoreProvider>,
    ) -> Result<Self> {
        let chunker = TextChunker::new(options.chunk_size, options.chunk_overlap)?;

        let path = options.vector_store_path.clone();
        let loaded = tokio::task::spawn_blocking(move || VectorIndex::load(&path))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        match &loaded {
            Some(index) => tracing::info!(
                "Loaded vector index from {} ({} chunks, {} documents)",
                options.vector_store_path.display(),
                index.len(),
                index.document_count()
            ),
            None => tracing::info!("No vector index found. Waiting for document uploads."),
        }

        Ok(Self {
            session: Arc::new(Mutex::new(ConversationSession::new(options.max_turns))),
            chunker,
            embedder: providers.embedder,
            llm: providers.llm,
            documents,
            index: Arc::new(RwLock::new(loaded.map(Arc::new))),
            ingest_lock: Arc::new(tokio::sync::Mutex::new(())),
            options,
        })
    }

    pub fn state(&self) -> PipelineState {
        if self.index.read().is_some() {
            PipelineState::Ready
        } else {
            PipelineState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == PipelineState::Ready
    }

    /// Current index snapshot
    pub fn snapshot(&self) -> Option<Arc<VectorIndex>> {
        self.index.read().clone()
    }

    pub fn document_store(&self) -> &Arc<dyn DocumentStoreProvider> {
        &self.documents
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Prior turns, oldest first
    pub fn conversation(&self) -> Vec<Turn> {
        self.session.lock().turns().to_vec()
    }

    /// Drop the conversation history
    pub fn reset_session(&self) {
        self.session.lock().clear();
        tracing::info!("Conversation session reset");
    }

    pub fn status(&self) -> StatusResponse {
        let snapshot = self.snapshot();
        StatusResponse {
            state: self.state(),
            indexed_chunks: snapshot.as_ref().map_or(0, |i| i.len()),
            documents: snapshot.as_ref().map_or(0, |i| i.document_count()),
            conversation_turns: self.session.lock().len(),
        }
    }

    /// Store an uploaded PDF, extract its text, and add it to the knowledge base
    ///
    /// Extraction and embedding share the `file_timeout` budget. Once the new
    /// index is being persisted the ingestion always runs to completion.
    pub async fn ingest_document(&self, filename: &str, data: &[u8]) -> Result<IngestOutcome> {
        let filename = sanitize_filename(filename)?;
        let start = Instant::now();
        let deadline = start + self.options.file_timeout;

        if !PdfExtractor::looks_like_pdf(data) {
            return Err(Error::file_parse(&filename, "file is not a PDF document"));
        }

        let storage_path = self.documents.store_document(&filename, data).await?;
        let mut document = Document::new(
            filename.clone(),
            storage_path,
            hash_content(data),
            data.len() as u64,
        );

        let owned = data.to_vec();
        let name = filename.clone();
        let extraction = async {
            tokio::task::spawn_blocking(move || PdfExtractor::extract(&name, &owned))
                .await
                .map_err(|e| Error::ingestion(&filename, format!("extraction task failed: {}", e)))
                .and_then(|extracted| extracted)
        };
        let extracted = within(deadline, extraction, || self.ingestion_timeout(&filename)).await?;
        document.total_pages = extracted.total_pages;

        let chunks = self.index_text(&document, &extracted.content, deadline).await?;
        document.total_chunks = chunks as u32;

        tracing::info!(
            "Ingested {} ({} pages, {} chunks) in {:.1}s",
            filename,
            document.total_pages.unwrap_or(0),
            chunks,
            start.elapsed().as_secs_f64()
        );

        Ok(IngestOutcome { document, chunks })
    }

    /// Chunk, embed, and index already-extracted text; returns the chunk count
    pub async fn ingest_text(&self, document: &Document, text: &str) -> Result<usize> {
        let deadline = Instant::now() + self.options.file_timeout;
        self.index_text(document, text, deadline).await
    }

    fn ingestion_timeout(&self, filename: &str) -> Error {
        Error::ingestion(
            filename,
            format!("timed out after {}s", self.options.file_timeout.as_secs()),
        )
    }

    async fn index_text(&self, document: &Document, text: &str, deadline: Instant) -> Result<usize> {
        let chunks = self.chunker.chunk_document(document, text);
        if chunks.is_empty() {
            return Err(Error::ingestion(&document.filename, "document contains no text"));
        }
        let count = chunks.len();

        // Waiting for the lock and embedding count against the budget; the
        // commit below does not.
        let prepare = async {
            let guard = self.ingest_lock.clone().lock_owned().await;
            let next = match self.snapshot() {
                Some(current) => current.add(chunks, self.embedder.as_ref()).await,
                None => VectorIndex::build(chunks, self.embedder.as_ref()).await,
            }
            .map_err(|e| match e {
                Error::Embedding(msg) => Error::Embedding(format!("{}: {}", document.filename, msg)),
                other => other,
            })?;
            Ok::<_, Error>((guard, next))
        };
        let (guard, next) =
            within(deadline, prepare, || self.ingestion_timeout(&document.filename)).await?;

        // Persist and publish on a blocking task that runs to completion even
        // if this request is cancelled, so disk and memory never diverge.
        let slot = self.index.clone();
        let session = self.session.clone();
        let dir = self.options.vector_store_path.clone();
        let reset = self.options.reset_on_ingest;
        tokio::task::spawn_blocking(move || -> Result<()> {
            let _guard = guard;
            next.save(&dir)?;
            *slot.write() = Some(Arc::new(next));
            if reset {
                session.lock().clear();
            }
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        Ok(count)
    }

    /// Answer a question against the knowledge base, recording the turn
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let index = self.snapshot().ok_or(Error::NotReady)?;
        let history = self.conversation();
        let budget = self.options.request_timeout;
        let secs = budget.as_secs();

        let retrieval_question = if self.options.condense_question && !history.is_empty() {
            let prompt = PromptBuilder::build_condense_prompt(question, &history);
            let condensed = within(Instant::now() + budget, self.llm.generate(&prompt), || {
                Error::generation(format!("question rewrite timed out after {}s", secs))
            })
            .await?;
            tracing::debug!("Condensed follow-up question to: {}", condensed);
            condensed
        } else {
            question.to_string()
        };

        let query = within(
            Instant::now() + budget,
            self.embedder.embed(&retrieval_question),
            || Error::embedding(format!("query embedding timed out after {}s", secs)),
        )
        .await?;
        let sources = index.search(&query, self.options.top_k)?;

        let prompt = PromptBuilder::build_answer_prompt(question, &sources, &history);
        let answer = within(Instant::now() + budget, self.llm.generate(&prompt), || {
            Error::generation(format!("answer generation timed out after {}s", secs))
        })
        .await?;

        self.session.lock().push(question, answer.clone());

        Ok(Answer { answer, sources })
    }
}
