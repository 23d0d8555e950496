use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{
    calendar_event::CalendarEventError, couple::CoupleError, notification::NotificationError,
    profile::ProfileError,
};
use services::services::{daily_questions::SchedulerError, mailer::MailerError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Couple(#[from] CoupleError),
    #[error(transparent)]
    CalendarEvent(#[from] CalendarEventError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Mailer(#[from] MailerError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Profile(ProfileError::ProfileNotFound)
            | ApiError::Couple(CoupleError::CoupleNotFound)
            | ApiError::CalendarEvent(CalendarEventError::EventNotFound)
            | ApiError::Notification(NotificationError::NotificationNotFound)
            | ApiError::Database(sqlx::Error::RowNotFound)
            | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Profile(ProfileError::EmailTaken)
            | ApiError::Couple(CoupleError::AlreadyPaired) => StatusCode::CONFLICT,
            ApiError::Couple(CoupleError::InviteCodeInvalid)
            | ApiError::Scheduler(SchedulerError::EmptyQuestionBank) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details go to the log, not the client
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
