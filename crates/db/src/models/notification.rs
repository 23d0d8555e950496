use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Notification not found")]
    NotificationNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DailyQuestion,
    Pulse,
    CalendarEvent,
    Chat,
}

/// One entry in a partner's notification feed.
///
/// (recipient_id, kind, source_id) is UNIQUE: `source_id` points at the row
/// that triggered the notification, so no trigger can ever fan out twice to
/// the same recipient no matter how many notifier passes see it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub source_id: Uuid,
    pub title: String,
    pub body: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date | null")]
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub source_id: Uuid,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Insert unless a notification for this (recipient, kind, source)
    /// already exists. Returns true when this call created the row.
    pub async fn create_if_absent(
        pool: &SqlitePool,
        data: &CreateNotification,
        notification_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO notifications (id, recipient_id, kind, source_id, title, body)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT(recipient_id, kind, source_id) DO NOTHING"#,
        )
        .bind(notification_id)
        .bind(data.recipient_id)
        .bind(data.kind)
        .bind(data.source_id)
        .bind(&data.title)
        .bind(&data.body)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_for_recipient(
        pool: &SqlitePool,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = if unread_only {
            r#"SELECT id, recipient_id, kind, source_id, title, body, created_at, read_at
               FROM notifications
               WHERE recipient_id = $1 AND read_at IS NULL
               ORDER BY created_at DESC"#
        } else {
            r#"SELECT id, recipient_id, kind, source_id, title, body, created_at, read_at
               FROM notifications
               WHERE recipient_id = $1
               ORDER BY created_at DESC"#
        };

        sqlx::query_as::<_, Notification>(query)
            .bind(recipient_id)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_read(pool: &SqlitePool, id: Uuid) -> Result<Self, NotificationError> {
        sqlx::query_as::<_, Notification>(
            r#"UPDATE notifications
               SET read_at = COALESCE(read_at, datetime('now', 'subsec'))
               WHERE id = $1
               RETURNING id, recipient_id, kind, source_id, title, body, created_at, read_at"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(NotificationError::NotificationNotFound)
    }

    pub async fn count_unread(pool: &SqlitePool, recipient_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM notifications
               WHERE recipient_id = $1 AND read_at IS NULL"#,
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await
    }

    /// Whether a notification for this (recipient, kind, source) exists.
    pub async fn exists(
        pool: &SqlitePool,
        recipient_id: Uuid,
        kind: NotificationKind,
        source_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM notifications
               WHERE recipient_id = $1 AND kind = $2 AND source_id = $3"#,
        )
        .bind(recipient_id)
        .bind(kind)
        .bind(source_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }
}
