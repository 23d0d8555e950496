use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Per-message notification marker. The UNIQUE(message_id, recipient_id)
/// constraint is what makes notifier passes idempotent.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ChatNotification {
    pub id: Uuid,
    pub message_id: Uuid,
    pub recipient_id: Uuid,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

/// Aggregated per-day badge row: one per (recipient, sender, day), carrying
/// a running count of the day's messages.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SimpleChatNotification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    pub notified_on: NaiveDate,
    pub message_count: i64,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

impl ChatNotification {
    /// Returns true when this call created the marker, false when another
    /// pass got there first.
    pub async fn create_if_absent(
        pool: &SqlitePool,
        id: Uuid,
        message_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO chat_notifications (id, message_id, recipient_id)
               VALUES ($1, $2, $3)
               ON CONFLICT(message_id, recipient_id) DO NOTHING"#,
        )
        .bind(id)
        .bind(message_id)
        .bind(recipient_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_for_recipient(
        pool: &SqlitePool,
        recipient_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatNotification>(
            r#"SELECT id, message_id, recipient_id, created_at
               FROM chat_notifications
               WHERE recipient_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(recipient_id)
        .fetch_all(pool)
        .await
    }
}

impl SimpleChatNotification {
    /// Fold `count` freshly notified messages into the day's badge row,
    /// creating it on first use.
    pub async fn record_messages(
        pool: &SqlitePool,
        id: Uuid,
        recipient_id: Uuid,
        sender_id: Uuid,
        notified_on: NaiveDate,
        count: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SimpleChatNotification>(
            r#"INSERT INTO simple_chat_notifications
                   (id, recipient_id, sender_id, notified_on, message_count)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(recipient_id, sender_id, notified_on) DO UPDATE SET
                   message_count = message_count + excluded.message_count,
                   updated_at = datetime('now', 'subsec')
               RETURNING id, recipient_id, sender_id, notified_on, message_count,
                         created_at, updated_at"#,
        )
        .bind(id)
        .bind(recipient_id)
        .bind(sender_id)
        .bind(notified_on)
        .bind(count)
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_recipient_on(
        pool: &SqlitePool,
        recipient_id: Uuid,
        notified_on: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SimpleChatNotification>(
            r#"SELECT id, recipient_id, sender_id, notified_on, message_count,
                      created_at, updated_at
               FROM simple_chat_notifications
               WHERE recipient_id = $1 AND notified_on = $2"#,
        )
        .bind(recipient_id)
        .bind(notified_on)
        .fetch_all(pool)
        .await
    }
}
