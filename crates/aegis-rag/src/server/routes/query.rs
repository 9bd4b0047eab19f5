//! Question answering and session endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{MessageResponse, QueryRequest, QueryResponse, SourceRef, StatusResponse};

/// POST /query - Answer a question from the uploaded documents
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();
    let question = request.validate()?;

    tracing::info!("Query: \"{}\"", question);

    let answer = state.pipeline().answer(question).await?;

    tracing::info!(
        "Answered in {}ms from {} chunks",
        start.elapsed().as_millis(),
        answer.sources.len()
    );

    Ok(Json(QueryResponse {
        answer: answer.answer,
        sources: answer.sources.iter().map(SourceRef::from).collect(),
    }))
}

/// POST /reset-session - Forget the conversation history
pub async fn reset_session(State(state): State<AppState>) -> Json<MessageResponse> {
    state.pipeline().reset_session();
    Json(MessageResponse::success("Conversation history cleared."))
}

/// GET /status - Knowledge base and session status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.pipeline().status())
}
