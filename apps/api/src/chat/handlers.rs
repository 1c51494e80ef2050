//! Axum route handlers for the chat API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /chat
///
/// Answers a free-text job query. Blank messages get a canned prompt rather than an error.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let answer = state.composer.answer(&request.message).await?;
    Ok(Json(ChatResponse { answer }))
}
