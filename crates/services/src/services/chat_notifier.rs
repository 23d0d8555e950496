use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use db::{
    DBService, RetryConfig,
    models::{
        chat_message::{ChatMessage, UnnotifiedMessage},
        chat_notification::{ChatNotification, SimpleChatNotification},
        notification::{CreateNotification, Notification, NotificationKind},
    },
    with_retry,
};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How much of a message body makes it into the notification preview.
const PREVIEW_MAX_CHARS: usize = 80;

/// Service that turns unread chat messages into notifications: a per-message
/// marker in `chat_notifications`, an entry in the recipient's feed, and the
/// day's aggregated badge row in `simple_chat_notifications`.
pub struct ChatNotifier {
    db: DBService,
    poll_interval: Duration,
    retry: RetryConfig,
}

impl ChatNotifier {
    pub fn new(db: DBService, poll_interval: Duration) -> Self {
        Self {
            db,
            poll_interval,
            retry: RetryConfig::default(),
        }
    }

    pub fn spawn(db: DBService, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
        let service = Self::new(db, poll_interval);
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting chat notifier with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.tick().await {
                error!("Error notifying chat messages: {}", e);
            }
        }
    }

    /// One pass over messages that still lack a notification for their
    /// recipient.
    pub async fn tick(&self) -> Result<(), sqlx::Error> {
        let unnotified = ChatMessage::find_unnotified(&self.db.pool).await?;

        if unnotified.is_empty() {
            debug!("No chat messages to notify");
            return Ok(());
        }

        let today = Utc::now().date_naive();
        let mut newly_notified: HashMap<(Uuid, Uuid), i64> = HashMap::new();

        for message in &unnotified {
            match self.notify_message(message).await {
                Ok(true) => {
                    *newly_notified
                        .entry((message.recipient_id, message.sender_id))
                        .or_insert(0) += 1;
                }
                Ok(false) => {} // another pass won the insert race
                Err(e) => {
                    warn!(
                        message_id = %message.message_id,
                        "Failed to notify chat message: {}",
                        e
                    );
                }
            }
        }

        let notified: i64 = newly_notified.values().sum();

        for ((recipient_id, sender_id), count) in newly_notified {
            if let Err(e) = SimpleChatNotification::record_messages(
                &self.db.pool,
                Uuid::new_v4(),
                recipient_id,
                sender_id,
                today,
                count,
            )
            .await
            {
                warn!(
                    recipient_id = %recipient_id,
                    "Failed to update chat badge: {}",
                    e
                );
            }
        }

        if notified > 0 {
            info!(notified, "Created chat notifications");
        }

        Ok(())
    }

    /// Returns true when this pass created the per-message marker.
    async fn notify_message(&self, message: &UnnotifiedMessage) -> Result<bool, sqlx::Error> {
        let created = ChatNotification::create_if_absent(
            &self.db.pool,
            Uuid::new_v4(),
            message.message_id,
            message.recipient_id,
        )
        .await?;

        if !created {
            return Ok(false);
        }

        let data = CreateNotification {
            recipient_id: message.recipient_id,
            kind: NotificationKind::Chat,
            source_id: message.message_id,
            title: format!("New message from {}", message.sender_name),
            body: preview(&message.body),
        };

        with_retry(&self.retry, "chat_notification", || {
            Notification::create_if_absent(&self.db.pool, &data, Uuid::new_v4())
        })
        .await?;

        Ok(true)
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() <= PREVIEW_MAX_CHARS {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through() {
        assert_eq!(preview("hey you"), "hey you");
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "é".repeat(100);
        let p = preview(&body);
        assert!(p.ends_with('…'));
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 1);
    }
}
