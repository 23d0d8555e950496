use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::notification::Notification;
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Deserialize, TS)]
pub struct NotificationQueryParams {
    pub recipient_id: Uuid,
    /// Only unread entries when true.
    #[serde(default)]
    pub unread: bool,
}

/// GET /api/notifications?recipient_id=&unread= - Notification feed
pub async fn get_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Notification>>>, ApiError> {
    let notifications =
        Notification::find_for_recipient(&state.db().pool, params.recipient_id, params.unread)
            .await?;
    Ok(ResponseJson(ApiResponse::success(notifications)))
}

/// GET /api/notifications/unread-count?recipient_id= - Badge count
pub async fn unread_count(
    State(state): State<AppState>,
    Query(params): Query<NotificationQueryParams>,
) -> Result<ResponseJson<ApiResponse<i64>>, ApiError> {
    let count = Notification::count_unread(&state.db().pool, params.recipient_id).await?;
    Ok(ResponseJson(ApiResponse::success(count)))
}

/// POST /api/notifications/{id}/read - Mark one entry read (idempotent)
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Notification>>, ApiError> {
    let notification = Notification::mark_read(&state.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(notification)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", post(mark_notification_read));

    Router::new().nest("/notifications", inner)
}
