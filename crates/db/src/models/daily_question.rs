use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A question scheduled for a given date, either for one couple or globally
/// (`couple_id` NULL).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DailyQuestion {
    pub id: Uuid,
    pub question_id: Uuid,
    pub couple_id: Option<Uuid>,
    pub scheduled_on: NaiveDate,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

/// Daily question joined with its prompt, the shape handed to clients.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DailyQuestionWithPrompt {
    pub id: Uuid,
    pub question_id: Uuid,
    pub couple_id: Option<Uuid>,
    pub scheduled_on: NaiveDate,
    pub prompt: String,
    pub category: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

impl DailyQuestion {
    /// Insert a schedule row unless the (scope, date) slot is already taken.
    /// Returns true when this call created the row. Losing the race is not an
    /// error: the day's question simply already exists.
    pub async fn insert_if_absent(
        pool: &SqlitePool,
        id: Uuid,
        question_id: Uuid,
        couple_id: Option<Uuid>,
        scheduled_on: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO daily_questions (id, question_id, couple_id, scheduled_on)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(id)
        .bind(question_id)
        .bind(couple_id)
        .bind(scheduled_on)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The row occupying the exact (scope, date) slot, if any.
    pub async fn find_for_scope_on(
        pool: &SqlitePool,
        couple_id: Option<Uuid>,
        scheduled_on: NaiveDate,
    ) -> Result<Option<DailyQuestionWithPrompt>, sqlx::Error> {
        sqlx::query_as::<_, DailyQuestionWithPrompt>(
            r#"SELECT dq.id, dq.question_id, dq.couple_id, dq.scheduled_on,
                      q.prompt, q.category, dq.created_at
               FROM daily_questions dq
               JOIN questions q ON q.id = dq.question_id
               WHERE dq.couple_id IS $1 AND dq.scheduled_on = $2"#,
        )
        .bind(couple_id)
        .bind(scheduled_on)
        .fetch_optional(pool)
        .await
    }

    /// Resolve the question a couple sees on a date: a couple-specific row
    /// shadows the global row. A global row is visible to every couple.
    pub async fn resolve_for_couple_on(
        pool: &SqlitePool,
        couple_id: Uuid,
        scheduled_on: NaiveDate,
    ) -> Result<Option<DailyQuestionWithPrompt>, sqlx::Error> {
        sqlx::query_as::<_, DailyQuestionWithPrompt>(
            r#"SELECT dq.id, dq.question_id, dq.couple_id, dq.scheduled_on,
                      q.prompt, q.category, dq.created_at
               FROM daily_questions dq
               JOIN questions q ON q.id = dq.question_id
               WHERE dq.scheduled_on = $2
                 AND (dq.couple_id = $1 OR dq.couple_id IS NULL)
               ORDER BY dq.couple_id IS NULL
               LIMIT 1"#,
        )
        .bind(couple_id)
        .bind(scheduled_on)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_on_date(
        pool: &SqlitePool,
        scheduled_on: NaiveDate,
    ) -> Result<Vec<DailyQuestionWithPrompt>, sqlx::Error> {
        sqlx::query_as::<_, DailyQuestionWithPrompt>(
            r#"SELECT dq.id, dq.question_id, dq.couple_id, dq.scheduled_on,
                      q.prompt, q.category, dq.created_at
               FROM daily_questions dq
               JOIN questions q ON q.id = dq.question_id
               WHERE dq.scheduled_on = $1
               ORDER BY dq.created_at"#,
        )
        .bind(scheduled_on)
        .fetch_all(pool)
        .await
    }
}
