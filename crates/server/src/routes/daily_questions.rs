use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::daily_question::{DailyQuestion, DailyQuestionWithPrompt};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct DrawRequest {
    /// Couple to draw for; omit for the global daily question.
    #[serde(default)]
    pub couple_id: Option<Uuid>,
}

#[derive(Deserialize, TS)]
pub struct TodayQueryParams {
    pub couple_id: Uuid,
}

/// POST /api/daily-questions/draw - Pick a random question and schedule it
/// for today. Idempotent: a repeat call returns the already-scheduled row.
pub async fn draw(
    State(state): State<AppState>,
    Json(payload): Json<DrawRequest>,
) -> Result<ResponseJson<ApiResponse<DailyQuestionWithPrompt>>, ApiError> {
    let today = Utc::now().date_naive();
    let scheduled = state.scheduler().draw(payload.couple_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(scheduled)))
}

/// GET /api/daily-questions/today?couple_id= - Today's question for a couple.
/// A couple-specific row wins over the global one.
pub async fn today(
    State(state): State<AppState>,
    Query(params): Query<TodayQueryParams>,
) -> Result<ResponseJson<ApiResponse<Option<DailyQuestionWithPrompt>>>, ApiError> {
    let today = Utc::now().date_naive();
    let question =
        DailyQuestion::resolve_for_couple_on(&state.db().pool, params.couple_id, today).await?;
    Ok(ResponseJson(ApiResponse::success(question)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/draw", post(draw))
        .route("/today", get(today));

    Router::new().nest("/daily-questions", inner)
}
