use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::profile::{CreateProfile, Profile, ProfileError, UpdateProfile};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// POST /api/profiles - Register a new account
pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfile>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    let profile = Profile::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

/// GET /api/profiles/{id} - Fetch a profile
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    let profile = Profile::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ProfileError::ProfileNotFound)?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

/// PUT /api/profiles/{id} - Update display name or push token
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfile>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    let profile = Profile::update(&state.db().pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", post(create_profile))
        .route("/{id}", get(get_profile).put(update_profile));

    Router::new().nest("/profiles", inner)
}
