use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::couple::{Couple, CoupleError};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct CreateCoupleRequest {
    pub profile_id: Uuid,
}

#[derive(Deserialize, TS)]
pub struct JoinCoupleRequest {
    pub profile_id: Uuid,
    pub invite_code: String,
}

#[derive(Deserialize, TS)]
pub struct MineQueryParams {
    pub profile_id: Uuid,
}

/// POST /api/couples - Start a pending couple and get an invite code
pub async fn create_couple(
    State(state): State<AppState>,
    Json(payload): Json<CreateCoupleRequest>,
) -> Result<ResponseJson<ApiResponse<Couple>>, ApiError> {
    let couple = Couple::create(&state.db().pool, payload.profile_id, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(couple)))
}

/// POST /api/couples/join - Redeem an invite code
pub async fn join_couple(
    State(state): State<AppState>,
    Json(payload): Json<JoinCoupleRequest>,
) -> Result<ResponseJson<ApiResponse<Couple>>, ApiError> {
    let couple = Couple::join(
        &state.db().pool,
        payload.invite_code.trim(),
        payload.profile_id,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(couple)))
}

/// GET /api/couples/mine?profile_id= - The caller's couple, if any
pub async fn my_couple(
    State(state): State<AppState>,
    Query(params): Query<MineQueryParams>,
) -> Result<ResponseJson<ApiResponse<Option<Couple>>>, ApiError> {
    let couple = Couple::find_for_profile(&state.db().pool, params.profile_id).await?;
    Ok(ResponseJson(ApiResponse::success(couple)))
}

/// GET /api/couples/{id} - Fetch a couple
pub async fn get_couple(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Couple>>, ApiError> {
    let couple = Couple::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(CoupleError::CoupleNotFound)?;
    Ok(ResponseJson(ApiResponse::success(couple)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", post(create_couple))
        .route("/join", post(join_couple))
        .route("/mine", get(my_couple))
        .route("/{id}", get(get_couple));

    Router::new().nest("/couples", inner)
}
