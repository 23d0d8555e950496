use anyhow::Error as AnyhowError;
use db::{
    DBService,
    models::question::{CreateQuestion, Question},
};
use server::{AppState, file_logging, routes};
use services::services::{
    chat_notifier::ChatNotifier, config::Config, daily_question_notifier::DailyQuestionNotifier,
    event_notifier::EventNotifier, pulse_notifier::PulseNotifier,
};
use sqlx::Error as SqlxError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TandemError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

/// Starter prompts so a fresh install has a daily question on day one.
const STARTER_QUESTIONS: &[(&str, &str)] = &[
    ("What made you smile today?", "daily"),
    ("What's one thing your partner did this week that you're grateful for?", "gratitude"),
    ("Where should our next trip together go?", "dreams"),
    ("What song reminds you of us?", "memories"),
    ("What's a small habit of mine you secretly love?", "fun"),
    ("If we had a free day tomorrow, how would you spend it together?", "fun"),
    ("What's something you want us to learn together?", "dreams"),
    ("What was your first impression of me?", "memories"),
    ("What's one way I can support you better this month?", "growth"),
    ("What are you most looking forward to this year, for us?", "dreams"),
];

#[tokio::main]
async fn main() -> Result<(), TandemError> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    // The guard must be held for the lifetime of the application to ensure
    // logs are flushed
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);

    let config = Config::from_env();
    let db = DBService::new().await?;

    if let Err(e) = seed_question_bank(&db).await {
        tracing::warn!("Failed to seed question bank: {}", e);
    }

    DailyQuestionNotifier::spawn(
        db.clone(),
        config.daily_question_poll_interval(),
        config.recent_question_window_days,
    );
    ChatNotifier::spawn(db.clone(), config.chat_poll_interval());
    EventNotifier::spawn(db.clone(), config.event_poll_interval());
    PulseNotifier::spawn(db.clone(), config.pulse_poll_interval());

    let state = AppState::new(db.clone(), config.clone());
    let app_router = routes::router(state);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("Server running on http://{}:{}", config.host, actual_port);

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    perform_cleanup_actions(&db).await;

    Ok(())
}

/// Populate the question bank on first run so the daily question scheduler
/// has something to draw from.
async fn seed_question_bank(db: &DBService) -> Result<(), SqlxError> {
    if Question::count(&db.pool).await? > 0 {
        return Ok(());
    }

    for (prompt, category) in STARTER_QUESTIONS {
        let data = CreateQuestion {
            prompt: (*prompt).to_string(),
            category: Some((*category).to_string()),
        };
        Question::create(&db.pool, &data, Uuid::new_v4()).await?;
    }

    tracing::info!(
        count = STARTER_QUESTIONS.len(),
        "Seeded the question bank with starter prompts"
    );

    Ok(())
}

pub async fn shutdown_signal() {
    // Always wait for Ctrl+C
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        // Try to install SIGTERM handler, but don't panic if it fails
        let terminate = async {
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Failed to install SIGTERM handler");
                // Fallback: never resolves
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}

pub async fn perform_cleanup_actions(db: &DBService) {
    // Run TRUNCATE checkpoint to ensure all WAL content is written to the
    // main database file before the process exits.
    tracing::info!("Running final WAL checkpoint...");
    match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(&db.pool)
        .await
    {
        Ok(_) => {
            tracing::info!("Final WAL checkpoint completed - all data flushed to main database")
        }
        Err(e) => tracing::warn!(
            "Final WAL checkpoint failed (data may still be in WAL): {}",
            e
        ),
    }

    tracing::info!("Closing database connection pool...");
    db.pool.close().await;
    tracing::info!("Database connection pool closed");
}
