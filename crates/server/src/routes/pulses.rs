use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    couple::{Couple, CoupleError},
    pulse::{Pulse, PulseKind},
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct SendPulseRequest {
    pub sender_id: Uuid,
    pub kind: PulseKind,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize, TS)]
pub struct PulseQueryParams {
    pub profile_id: Uuid,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// POST /api/pulses - Send a pulse to the partner. The recipient is always
/// the other member of the sender's couple.
pub async fn send_pulse(
    State(state): State<AppState>,
    Json(payload): Json<SendPulseRequest>,
) -> Result<ResponseJson<ApiResponse<Pulse>>, ApiError> {
    let couple = Couple::find_for_profile(&state.db().pool, payload.sender_id)
        .await?
        .ok_or(CoupleError::CoupleNotFound)?;

    let recipient = couple.partner_of(payload.sender_id).ok_or_else(|| {
        ApiError::BadRequest("Your partner hasn't joined yet".to_string())
    })?;

    let pulse = Pulse::create(
        &state.db().pool,
        Uuid::new_v4(),
        couple.id,
        payload.sender_id,
        recipient,
        payload.kind,
        payload.note.as_deref(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(pulse)))
}

/// GET /api/pulses?profile_id= - Pulses received, newest first
pub async fn get_pulses(
    State(state): State<AppState>,
    Query(params): Query<PulseQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Pulse>>>, ApiError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let pulses = Pulse::find_received(&state.db().pool, params.profile_id, limit).await?;
    Ok(ResponseJson(ApiResponse::success(pulses)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new().route("/", get(get_pulses).post(send_pulse));

    Router::new().nest("/pulses", inner)
}
