use std::time::Duration;

use chrono::Utc;
use db::{
    DBService, RetryConfig,
    models::{
        couple::Couple,
        daily_question::{DailyQuestion, DailyQuestionWithPrompt},
        notification::{CreateNotification, Notification, NotificationKind},
    },
    with_retry,
};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::daily_questions::{DailyQuestionScheduler, SchedulerError};

/// Service that makes sure every paired couple gets its daily question
/// notification exactly once per partner per day.
pub struct DailyQuestionNotifier {
    db: DBService,
    scheduler: DailyQuestionScheduler,
    poll_interval: Duration,
    retry: RetryConfig,
}

impl DailyQuestionNotifier {
    pub fn new(db: DBService, poll_interval: Duration, window_days: u32) -> Self {
        let scheduler = DailyQuestionScheduler::new(db.clone(), window_days);
        Self {
            db,
            scheduler,
            poll_interval,
            retry: RetryConfig::default(),
        }
    }

    pub fn spawn(
        db: DBService,
        poll_interval: Duration,
        window_days: u32,
    ) -> tokio::task::JoinHandle<()> {
        let service = Self::new(db, poll_interval, window_days);
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting daily question notifier with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.tick().await {
                error!("Error notifying daily questions: {}", e);
            }
        }
    }

    /// One pass: ensure today's global question exists, then fan out
    /// notifications to both partners of every paired couple.
    pub async fn tick(&self) -> Result<(), SchedulerError> {
        let today = Utc::now().date_naive();

        // Self-healing: the draw endpoint may never have been called today.
        match self.scheduler.draw(None, today).await {
            Ok(_) => {}
            Err(SchedulerError::EmptyQuestionBank) => {
                debug!("Question bank is empty, nothing to schedule");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let couples = Couple::find_all_paired(&self.db.pool).await?;

        if couples.is_empty() {
            debug!("No paired couples to notify");
            return Ok(());
        }

        let mut created = 0usize;
        for couple in couples {
            let Some(dq) =
                DailyQuestion::resolve_for_couple_on(&self.db.pool, couple.id, today).await?
            else {
                continue;
            };

            match self.notify_couple(&couple, &dq).await {
                Ok(n) => created += n,
                Err(e) => {
                    // One couple failing shouldn't stop the fan-out
                    warn!(
                        couple_id = %couple.id,
                        "Failed to notify couple of daily question: {}",
                        e
                    );
                }
            }
        }

        if created > 0 {
            info!(created, "Created daily question notifications");
        }

        Ok(())
    }

    async fn notify_couple(
        &self,
        couple: &Couple,
        dq: &DailyQuestionWithPrompt,
    ) -> Result<usize, sqlx::Error> {
        let mut created = 0usize;

        for member in couple.members() {
            let data = CreateNotification {
                recipient_id: member,
                kind: NotificationKind::DailyQuestion,
                source_id: dq.id,
                title: "Today's question".to_string(),
                body: dq.prompt.clone(),
            };

            let was_created = with_retry(&self.retry, "daily_question_notification", || {
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
