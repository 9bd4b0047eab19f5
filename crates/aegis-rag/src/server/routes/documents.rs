//! Document upload and listing endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{DocumentListResponse, DocumentSummary, UploadResponse};

/// POST /upload-document - Store a PDF and add it to the knowledge base
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::InvalidRequest("file field has no file name".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidRequest(format!("Failed to read file: {}", e)))?;

        tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

        let outcome = state.pipeline().ingest_document(&filename, &data).await?;
        return Ok(Json(UploadResponse::success(
            outcome.document.filename,
            outcome.chunks,
        )));
    }

    Err(Error::InvalidRequest("missing multipart field 'file'".to_string()))
}

/// GET /documents - List stored documents
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentListResponse>> {
    let stored = state.pipeline().document_store().list_documents().await?;
    let snapshot = state.pipeline().snapshot();

    let documents: Vec<DocumentSummary> = stored
        .into_iter()
        .map(|doc| DocumentSummary {
            indexed_chunks: snapshot.as_ref().map_or(0, |i| i.chunks_for(&doc.filename)),
            filename: doc.filename,
            size: doc.size,
        })
        .collect();

    Ok(Json(DocumentListResponse {
        total: documents.len(),
        documents,
    }))
}
