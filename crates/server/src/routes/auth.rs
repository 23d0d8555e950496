use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct RequestOtpPayload {
    pub email: String,
}

/// POST /api/auth/otp - Email a one-time sign-in code.
///
/// The response never carries the code; delivery happens through the mailer.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpPayload>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }

    state.otp().request_code(email).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new().route("/otp", post(request_otp));

    Router::new().nest("/auth", inner)
}
