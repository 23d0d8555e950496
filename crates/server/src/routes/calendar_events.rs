use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    calendar_event::{
        CalendarEvent, CalendarEventError, CreateCalendarEvent, UpdateCalendarEvent,
    },
    couple::{Couple, CoupleError},
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct EventQueryParams {
    pub couple_id: Uuid,
}

/// GET /api/calendar-events?couple_id= - A couple's events, soonest first
pub async fn get_events(
    State(state): State<AppState>,
    Query(params): Query<EventQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<CalendarEvent>>>, ApiError> {
    let events = CalendarEvent::find_for_couple(&state.db().pool, params.couple_id).await?;
    Ok(ResponseJson(ApiResponse::success(events)))
}

/// POST /api/calendar-events - Create an event
pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<CreateCalendarEvent>,
) -> Result<ResponseJson<ApiResponse<CalendarEvent>>, ApiError> {
    let couple = Couple::find_by_id(&state.db().pool, payload.couple_id)
        .await?
        .ok_or(CoupleError::CoupleNotFound)?;

    if !couple.members().contains(&payload.created_by) {
        return Err(ApiError::BadRequest(
            "Creator is not a member of this couple".to_string(),
        ));
    }

    let event = CalendarEvent::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

/// PUT /api/calendar-events/{id} - Update an event
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCalendarEvent>,
) -> Result<ResponseJson<ApiResponse<CalendarEvent>>, ApiError> {
    let event = CalendarEvent::update(&state.db().pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

/// DELETE /api/calendar-events/{id} - Delete an event
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = CalendarEvent::delete(&state.db().pool, id).await?;
    if rows_affected == 0 {
        Err(ApiError::CalendarEvent(CalendarEventError::EventNotFound))
    } else {
        Ok(ResponseJson(ApiResponse::success(())))
    }
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(get_events).post(create_event))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event));

    Router::new().nest("/calendar-events", inner)
}

/// GET /api/calendar-events/{id} - Fetch one event
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CalendarEvent>>, ApiError> {
    let event = CalendarEvent::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(CalendarEventError::EventNotFound)?;
    Ok(ResponseJson(ApiResponse::success(event)))
}
