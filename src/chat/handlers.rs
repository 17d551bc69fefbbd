use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{ChatRequest, ChatResponse},
    services::answer_question,
};
use crate::{error::AppError, extract::ApiJson, state::AppState};

const MAX_MESSAGE_CHARS: usize = 2000;

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = payload.message.trim();
    let user_id = payload.user_id.trim();

    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".into()));
    }
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::BadRequest(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let text = answer_question(&state, user_id, message).await?;
    Ok(Json(ChatResponse { text }))
}
