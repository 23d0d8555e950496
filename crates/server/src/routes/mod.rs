use axum::{
    Router,
    routing::{IntoMakeService, get},
};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub mod auth;
pub mod calendar_events;
pub mod chat;
pub mod couples;
pub mod daily_questions;
pub mod health;
pub mod notifications;
pub mod profiles;
pub mod pulses;
pub mod questions;

pub fn router(state: AppState) -> IntoMakeService<Router> {
    // Note: health check is inside base_routes so it gets the State<AppState>
    let base_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(profiles::router())
        .merge(couples::router())
        .merge(questions::router())
        .merge(daily_questions::router())
        .merge(calendar_events::router())
        .merge(pulses::router())
        .merge(chat::router())
        .merge(notifications::router())
        .merge(auth::router())
        .with_state(state);

    Router::new()
        .nest("/api", base_routes)
        .layer(CorsLayer::permissive())
        .into_make_service()
}
