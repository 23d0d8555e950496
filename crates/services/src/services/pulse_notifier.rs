use std::time::Duration;

use db::{
    DBService, RetryConfig,
    models::{
        notification::{CreateNotification, Notification, NotificationKind},
        pulse::{Pulse, UnnotifiedPulse},
    },
    with_retry,
};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Service that delivers pulses to the partner's notification feed.
pub struct PulseNotifier {
    db: DBService,
    poll_interval: Duration,
    retry: RetryConfig,
}

impl PulseNotifier {
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
            "Starting pulse notifier with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.tick().await {
                error!("Error notifying pulses: {}", e);
            }
        }
    }

    pub async fn tick(&self) -> Result<(), sqlx::Error> {
        let unnotified = Pulse::find_unnotified(&self.db.pool).await?;

        if unnotified.is_empty() {
            debug!("No pulses to notify");
            return Ok(());
        }

        let mut created = 0usize;
        for pulse in &unnotified {
            match self.notify_pulse(pulse).await {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(pulse_id = %pulse.id, "Failed to notify pulse: {}", e);
                }
            }
        }

        if created > 0 {
            info!(created, "Created pulse notifications");
        }

        Ok(())
    }

    async fn notify_pulse(&self, pulse: &UnnotifiedPulse) -> Result<bool, sqlx::Error> {
        let data = CreateNotification {
            recipient_id: pulse.recipient_id,
            kind: NotificationKind::Pulse,
            source_id: pulse.id,
            title: format!("{} {}", pulse.sender_name, pulse.kind.headline()),
            body: pulse
                .note
                .clone()
                .unwrap_or_else(|| "Open the app to send one back".to_string()),
        };

        with_retry(&self.retry, "pulse_notification", || {
            Notification::create_if_absent(&self.db.pool, &data, Uuid::new_v4())
        })
        .await
    }
}
