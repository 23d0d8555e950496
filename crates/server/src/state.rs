use std::sync::Arc;

use db::DBService;
use services::services::{
    config::Config,
    daily_questions::DailyQuestionScheduler,
    mailer::{LogMailer, OtpService},
};

/// Shared handle threaded through every route via axum `State`.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    config: Arc<Config>,
    otp: Arc<OtpService>,
    scheduler: DailyQuestionScheduler,
}

impl AppState {
    pub fn new(db: DBService, config: Config) -> Self {
        let otp = Arc::new(OtpService::new(
            Arc::new(LogMailer),
            config.otp_code_length,
            config.otp_ttl_minutes,
        ));
        let scheduler =
            DailyQuestionScheduler::new(db.clone(), config.recent_question_window_days);
        Self {
            db,
            config: Arc::new(config),
            otp,
            scheduler,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn otp(&self) -> &OtpService {
        &self.otp
    }

    pub fn scheduler(&self) -> &DailyQuestionScheduler {
        &self.scheduler
    }
}
