use std::time::Duration;

use chrono::Utc;
use db::{
    DBService, RetryConfig,
    models::{
        calendar_event::CalendarEvent,
        couple::Couple,
        notification::{CreateNotification, Notification, NotificationKind},
    },
    with_retry,
};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Service that reminds both partners of an upcoming calendar event once its
/// reminder window opens.
pub struct EventNotifier {
    db: DBService,
    poll_interval: Duration,
    retry: RetryConfig,
}

impl EventNotifier {
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
            "Starting event notifier with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.tick().await {
                error!("Error notifying calendar events: {}", e);
            }
        }
    }

    /// One pass over events whose reminder window is open. Events already
    /// notified are filtered out by the notify-once constraint, not here.
    pub async fn tick(&self) -> Result<(), sqlx::Error> {
        let due = CalendarEvent::find_due_for_reminder(&self.db.pool, Utc::now()).await?;

        if due.is_empty() {
            debug!("No calendar events due for a reminder");
            return Ok(());
        }

        let mut created = 0usize;
        for event in due {
            match self.notify_event(&event).await {
                Ok(n) => created += n,
                Err(e) => {
                    warn!(
                        event_id = %event.id,
                        "Failed to notify calendar event: {}",
                        e
                    );
                }
            }
        }

        if created > 0 {
            info!(created, "Created calendar event reminders");
        }

        Ok(())
    }

    async fn notify_event(&self, event: &CalendarEvent) -> Result<usize, sqlx::Error> {
        let Some(couple) = Couple::find_by_id(&self.db.pool, event.couple_id).await? else {
            warn!(event_id = %event.id, "Event references a missing couple");
            return Ok(0);
        };

        let mut created = 0usize;
        for member in couple.members() {
            let data = CreateNotification {
                recipient_id: member,
                kind: NotificationKind::CalendarEvent,
                source_id: event.id,
                title: event.title.clone(),
                body: format!(
                    "Coming up at {}",
                    event.starts_at.format("%Y-%m-%d %H:%M UTC")
                ),
            };

            let was_created = with_retry(&self.retry, "event_notification", || {
                Notification::create_if_absent(&self.db.pool, &data, Uuid::new_v4())
            })
            .await?;

            if was_created {
                created += 1;
            }
        }

        Ok(created)
    }
}
