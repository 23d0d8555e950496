use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CalendarEventError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Calendar event not found")]
    EventNotFound,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[ts(type = "Date")]
    pub starts_at: DateTime<Utc>,
    #[ts(type = "Date | null")]
    pub ends_at: Option<DateTime<Utc>>,
    pub remind_minutes_before: i64,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateCalendarEvent {
    pub couple_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[ts(type = "Date")]
    pub starts_at: DateTime<Utc>,
    #[ts(type = "Date | null")]
    pub ends_at: Option<DateTime<Utc>>,
    pub remind_minutes_before: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateCalendarEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    #[ts(type = "Date | null")]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(type = "Date | null")]
    pub ends_at: Option<DateTime<Utc>>,
    pub remind_minutes_before: Option<i64>,
}

const COLUMNS: &str = "id, couple_id, created_by, title, description, starts_at, ends_at, \
                       remind_minutes_before, created_at, updated_at";

impl CalendarEvent {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCalendarEvent,
        event_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"INSERT INTO calendar_events
                   (id, couple_id, created_by, title, description, starts_at, ends_at,
                    remind_minutes_before)
               VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 60))
               RETURNING {COLUMNS}"#
        ))
        .bind(event_id)
        .bind(data.couple_id)
        .bind(data.created_by)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.remind_minutes_before)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"SELECT {COLUMNS} FROM calendar_events WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_for_couple(
        pool: &SqlitePool,
        couple_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"SELECT {COLUMNS}
               FROM calendar_events
               WHERE couple_id = $1
               ORDER BY starts_at"#
        ))
        .bind(couple_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCalendarEvent,
    ) -> Result<Self, CalendarEventError> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"UPDATE calendar_events
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   starts_at = COALESCE($4, starts_at),
                   ends_at = COALESCE($5, ends_at),
                   remind_minutes_before = COALESCE($6, remind_minutes_before),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.remind_minutes_before)
        .fetch_optional(pool)
        .await?
        .ok_or(CalendarEventError::EventNotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM calendar_events WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Events whose reminder window has opened but which haven't started yet.
    /// `datetime()` normalizes both the stored RFC 3339 text and the bound
    /// timestamp, so the comparison is on canonical form.
    pub async fn find_due_for_reminder(
        pool: &SqlitePool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"SELECT {COLUMNS}
               FROM calendar_events
               WHERE datetime(starts_at, '-' || remind_minutes_before || ' minutes')
                     <= datetime($1)
                 AND datetime(starts_at) > datetime($1)
               ORDER BY starts_at"#
        ))
        .bind(now)
        .fetch_all(pool)
        .await
    }
}
