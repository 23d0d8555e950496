use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ChatMessage {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date | null")]
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateChatMessage {
    pub couple_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
}

/// A message whose recipient has no per-message chat notification yet.
/// The recipient is derived from the couple row: whichever member is not
/// the sender.
#[derive(Debug, Clone, FromRow)]
pub struct UnnotifiedMessage {
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub sender_name: String,
    pub body: String,
}

impl ChatMessage {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateChatMessage,
        message_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"INSERT INTO chat_messages (id, couple_id, sender_id, body)
               VALUES ($1, $2, $3, $4)
               RETURNING id, couple_id, sender_id, body, created_at, read_at"#,
        )
        .bind(message_id)
        .bind(data.couple_id)
        .bind(data.sender_id)
        .bind(&data.body)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"SELECT id, couple_id, sender_id, body, created_at, read_at
               FROM chat_messages
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Latest messages for a couple, newest first.
    pub async fn find_for_couple(
        pool: &SqlitePool,
        couple_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"SELECT id, couple_id, sender_id, body, created_at, read_at
               FROM chat_messages
               WHERE couple_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#,
        )
        .bind(couple_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Stamp a message as read. Already-read messages keep their original
    /// timestamp.
    pub async fn mark_read(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE chat_messages
               SET read_at = datetime('now', 'subsec')
               WHERE id = $1 AND read_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Messages in paired couples that still lack a chat_notifications row
    /// for their recipient.
    pub async fn find_unnotified(pool: &SqlitePool) -> Result<Vec<UnnotifiedMessage>, sqlx::Error> {
        sqlx::query_as::<_, UnnotifiedMessage>(
            r#"SELECT m.id AS message_id,
                      m.sender_id,
                      CASE WHEN c.created_by = m.sender_id THEN c.partner_id
                           ELSE c.created_by END AS recipient_id,
                      s.display_name AS sender_name,
                      m.body
               FROM chat_messages m
               JOIN couples c ON c.id = m.couple_id
               JOIN profiles s ON s.id = m.sender_id
               LEFT JOIN chat_notifications cn
                      ON cn.message_id = m.id
                     AND cn.recipient_id = CASE WHEN c.created_by = m.sender_id
                                                THEN c.partner_id
                                                ELSE c.created_by END
               WHERE c.partner_id IS NOT NULL
                 AND cn.id IS NULL
               ORDER BY m.created_at"#,
        )
        .fetch_all(pool)
        .await
    }
}
