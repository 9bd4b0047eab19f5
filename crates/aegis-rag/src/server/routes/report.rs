//! HTML report to PDF endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{PdfBase64Response, ReportRequest};

async fn render(state: &AppState, request: &ReportRequest) -> Result<Vec<u8>> {
    if request.html_content.trim().is_empty() {
        return Err(Error::InvalidRequest("html_content must not be empty".to_string()));
    }
    state.renderer().render(&request.html_content).await
}

/// POST /generate-pdf-binary - Render HTML and return the PDF as a download
pub async fn generate_pdf_binary(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Response> {
    let pdf = render(&state, &request).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.config().report.filename
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// POST /generate-pdf - Render HTML and return the PDF base64-encoded
pub async fn generate_pdf_base64(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<PdfBase64Response>> {
    let pdf = render(&state, &request).await?;

    Ok(Json(PdfBase64Response {
        status: "success".to_string(),
        pdf_content_base64: STANDARD.encode(pdf),
    }))
}
