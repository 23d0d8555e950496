use chrono::{Days, NaiveDate};
use db::{
    DBService,
    models::{
        daily_question::{DailyQuestion, DailyQuestionWithPrompt},
        question::Question,
    },
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("The question bank is empty")]
    EmptyQuestionBank,
}

/// Draws a random question for a date and scope (one couple, or global when
/// `couple_id` is None) and pins it in `daily_questions`.
///
/// Draws are idempotent per (scope, day): the first insert wins and every
/// later call returns the same row. Questions scheduled within the exclusion
/// window are avoided until the bank runs dry, at which point any question
/// may repeat.
#[derive(Clone)]
pub struct DailyQuestionScheduler {
    db: DBService,
    window_days: u32,
}

impl DailyQuestionScheduler {
    pub fn new(db: DBService, window_days: u32) -> Self {
        Self { db, window_days }
    }

    pub async fn draw(
        &self,
        couple_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<DailyQuestionWithPrompt, SchedulerError> {
        if let Some(existing) =
            DailyQuestion::find_for_scope_on(&self.db.pool, couple_id, today).await?
        {
            return Ok(existing);
        }

        let since = today
            .checked_sub_days(Days::new(self.window_days as u64))
            .unwrap_or(NaiveDate::MIN);

        let question =
            match Question::pick_random_excluding_recent(&self.db.pool, couple_id, since).await? {
                Some(q) => q,
                None => {
                    debug!(
                        window_days = self.window_days,
                        "Exclusion window exhausted the bank, allowing repeats"
                    );
                    Question::pick_random(&self.db.pool)
                        .await?
                        .ok_or(SchedulerError::EmptyQuestionBank)?
                }
            };

        DailyQuestion::insert_if_absent(&self.db.pool, Uuid::new_v4(), question.id, couple_id, today)
            .await?;

        // Return whichever row occupies the slot now; losing the insert race
        // just means someone else drew first.
        DailyQuestion::find_for_scope_on(&self.db.pool, couple_id, today)
            .await?
            .ok_or(SchedulerError::Database(sqlx::Error::RowNotFound))
    }
}
