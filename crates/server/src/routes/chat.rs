use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    chat_message::{ChatMessage, CreateChatMessage},
    couple::{Couple, CoupleError},
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct MessageQueryParams {
    pub couple_id: Uuid,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// POST /api/chat/messages - Send a message to the couple's chat
pub async fn create_message(
    State(state): State<AppState>,
    Json(payload): Json<CreateChatMessage>,
) -> Result<ResponseJson<ApiResponse<ChatMessage>>, ApiError> {
    if payload.body.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }

    let couple = Couple::find_by_id(&state.db().pool, payload.couple_id)
        .await?
        .ok_or(CoupleError::CoupleNotFound)?;

    if !couple.members().contains(&payload.sender_id) {
        return Err(ApiError::BadRequest(
            "Sender is not a member of this couple".to_string(),
        ));
    }

    let message = ChatMessage::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(message)))
}

/// GET /api/chat/messages?couple_id= - Latest messages, newest first
pub async fn get_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let messages = ChatMessage::find_for_couple(&state.db().pool, params.couple_id, limit).await?;
    Ok(ResponseJson(ApiResponse::success(messages)))
}

/// POST /api/chat/messages/{id}/read - Mark a message read (idempotent)
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ChatMessage>>, ApiError> {
    ChatMessage::find_by_id(&state.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    ChatMessage::mark_read(&state.db().pool, id).await?;

    let message = ChatMessage::find_by_id(&state.db().pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(message)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/messages", get(get_messages).post(create_message))
        .route("/messages/{id}/read", post(mark_message_read));

    Router::new().nest("/chat", inner)
}
