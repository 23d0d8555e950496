use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// The affection taps a partner can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PulseKind {
    Hug,
    Kiss,
    MissYou,
    ThinkingOfYou,
}

impl PulseKind {
    /// Notification headline for this kind of pulse.
    pub fn headline(&self) -> &'static str {
        match self {
            PulseKind::Hug => "sent you a hug",
            PulseKind::Kiss => "sent you a kiss",
            PulseKind::MissYou => "misses you",
            PulseKind::ThinkingOfYou => "is thinking of you",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Pulse {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: PulseKind,
    pub note: Option<String>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

/// A pulse the notifier hasn't materialized a notification for yet, joined
/// with the sender's name for the notification text.
#[derive(Debug, Clone, FromRow)]
pub struct UnnotifiedPulse {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: PulseKind,
    pub note: Option<String>,
    pub sender_name: String,
}

impl Pulse {
    pub async fn create(
        pool: &SqlitePool,
        pulse_id: Uuid,
        couple_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        kind: PulseKind,
        note: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Pulse>(
            r#"INSERT INTO pulses (id, couple_id, sender_id, recipient_id, kind, note)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, couple_id, sender_id, recipient_id, kind, note, created_at"#,
        )
        .bind(pulse_id)
        .bind(couple_id)
        .bind(sender_id)
        .bind(recipient_id)
        .bind(kind)
        .bind(note)
        .fetch_one(pool)
        .await
    }

    pub async fn find_received(
        pool: &SqlitePool,
        recipient_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Pulse>(
            r#"SELECT id, couple_id, sender_id, recipient_id, kind, note, created_at
               FROM pulses
               WHERE recipient_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#,
        )
        .bind(recipient_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Pulses with no notification row for their recipient yet.
    pub async fn find_unnotified(pool: &SqlitePool) -> Result<Vec<UnnotifiedPulse>, sqlx::Error> {
        sqlx::query_as::<_, UnnotifiedPulse>(
            r#"SELECT p.id, p.recipient_id, p.kind, p.note, s.display_name AS sender_name
               FROM pulses p
               JOIN profiles s ON s.id = p.sender_id
               LEFT JOIN notifications n
                      ON n.kind = 'pulse'
                     AND n.source_id = p.id
                     AND n.recipient_id = p.recipient_id
               WHERE n.id IS NULL
               ORDER BY p.created_at"#,
        )
        .fetch_all(pool)
        .await
    }
}
