use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub category: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateQuestion {
    pub prompt: String,
    pub category: Option<String>,
}

impl Question {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateQuestion,
        question_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"INSERT INTO questions (id, prompt, category)
               VALUES ($1, $2, COALESCE($3, 'general'))
               RETURNING id, prompt, category, created_at"#,
        )
        .bind(question_id)
        .bind(&data.prompt)
        .bind(&data.category)
        .fetch_one(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"SELECT id, prompt, category, created_at
               FROM questions
               ORDER BY created_at"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"SELECT id, prompt, category, created_at
               FROM questions
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM questions"#)
            .fetch_one(pool)
            .await
    }

    /// Pick a random question that has not been scheduled for the given scope
    /// since `since`. `couple_id` NULL means the global scope. Returns None
    /// when every question in the bank was used within the window.
    pub async fn pick_random_excluding_recent(
        pool: &SqlitePool,
        couple_id: Option<Uuid>,
        since: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"SELECT id, prompt, category, created_at
               FROM questions
               WHERE id NOT IN (
                   SELECT question_id FROM daily_questions
                   WHERE couple_id IS $1 AND scheduled_on >= $2
               )
               ORDER BY RANDOM()
               LIMIT 1"#,
        )
        .bind(couple_id)
        .bind(since)
        .fetch_optional(pool)
        .await
    }

    /// Unconditional random pick, used when the exclusion window exhausts the
    /// bank.
    pub async fn pick_random(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"SELECT id, prompt, category, created_at
               FROM questions
               ORDER BY RANDOM()
               LIMIT 1"#,
        )
        .fetch_optional(pool)
        .await
    }
}
