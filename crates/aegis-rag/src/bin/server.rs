//! Aegis server binary
//!
//! Run with: cargo run -p aegis-rag --bin aegis-rag-server

use aegis_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegis_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.llm.effective_backend());
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Documents: {}", config.storage.documents_dir.display());
    tracing::info!("  - Vector store: {}", config.storage.vector_store_path.display());

    if config.llm.api_key.is_none() {
        tracing::warn!(
            "OPENAI_API_KEY is not set; using Ollama at {}",
            config.llm.ollama_url
        );
    }
    if config.smtp.is_none() {
        tracing::warn!("SMTP_SERVER, SMTP_USER or SMTP_PASSWORD not set; email is disabled");
    }

    let server = RagServer::new(config).await?;

    let pipeline = server.state().pipeline();
    match pipeline.embedder().health_check().await {
        Ok(true) => tracing::info!("Embedding provider {} is reachable", pipeline.embedder().name()),
        _ => tracing::warn!(
            "Embedding provider {} is not reachable; uploads and questions will fail until it is",
            pipeline.embedder().name()
        ),
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload-document     - Upload a PDF");
    println!("  POST /query               - Ask questions");
    println!("  POST /generate-pdf-binary - Render an HTML report");
    println!("  POST /send-email          - Email a report");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
