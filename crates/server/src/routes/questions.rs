use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::question::{CreateQuestion, Question};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// GET /api/questions - The whole question bank
pub async fn get_questions(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Question>>>, ApiError> {
    let questions = Question::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(questions)))
}

/// POST /api/questions - Add a question to the bank
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestion>,
) -> Result<ResponseJson<ApiResponse<Question>>, ApiError> {
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt must not be empty".to_string()));
    }
    let question = Question::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(question)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new().route("/", get(get_questions).post(create_question));

    Router::new().nest("/questions", inner)
}
