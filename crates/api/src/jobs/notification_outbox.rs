//! Notification outbox delivery job.
//!
//! Claims due outbox rows, hands them to a [`NotificationService`] and
//! records the outcome. Failed rows are retried with exponential backoff
//! until `max_attempts`, then dead-lettered.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain::services::{NotificationResult, NotificationService};
use persistence::entities::OutboxEntity;
use persistence::repositories::NotificationRepository;
use shared::backoff::Backoff;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use crate::config::NotificationsConfig;
use crate::middleware::metrics::{record_notification_dead_lettered, record_notification_delivered};

use super::scheduler::{Job, JobFrequency};

/// What to do with a row after one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Delivered(&'static str),
    Retry { delay: Duration, error: String },
    Dead { error: String },
}

/// `attempts` counts the attempts made before this one.
fn decide(
    result: NotificationResult,
    attempts: i32,
    max_attempts: i32,
    backoff: &Backoff,
) -> Outcome {
    match result {
        NotificationResult::Sent => Outcome::Delivered("sent"),
        NotificationResult::NoToken => Outcome::Delivered("no_token"),
        NotificationResult::Skipped => Outcome::Delivered("skipped"),
        NotificationResult::Failed(error) => {
            let failed = attempts.saturating_add(1);
            if failed >= max_attempts {
                Outcome::Dead { error }
            } else {
                let delay = backoff.delay_after(u32::try_from(failed).unwrap_or(u32::MAX));
                Outcome::Retry { delay, error }
            }
        }
    }
}

pub struct NotificationOutboxJob {
    repo: NotificationRepository,
    delivery: Arc<dyn NotificationService>,
    poll_interval_secs: u64,
    batch_size: i64,
    max_attempts: i32,
    backoff: Backoff,
}

impl NotificationOutboxJob {
    pub fn new(
        pool: PgPool,
        delivery: Arc<dyn NotificationService>,
        config: &NotificationsConfig,
    ) -> Self {
        Self {
            repo: NotificationRepository::new(pool),
            delivery,
            poll_interval_secs: config.poll_interval_secs.max(1),
            batch_size: config.batch_size,
            max_attempts: config.max_attempts,
            backoff: Backoff::new(
                Duration::from_secs(config.backoff_base_secs),
                Duration::from_secs(config.backoff_max_secs),
            ),
        }
    }

    /// Delivers one claimed row. Returns true if it reached a final state.
    async fn process(&self, row: &OutboxEntity) -> Result<bool, sqlx::Error> {
        let message = row.to_message();
        let result = self.delivery.deliver(row.user_id, &message).await;

        match decide(result, row.attempts, self.max_attempts, &self.backoff) {
            Outcome::Delivered(outcome) => {
                self.repo.mark_delivered(row.id).await?;
                record_notification_delivered(outcome);
                debug!(
                    outbox_id = %row.id,
                    recipient = %row.user_id,
                    outcome,
                    "Notification delivered"
                );
                Ok(true)
            }
            Outcome::Retry { delay, error } => {
                let next_attempt_at =
                    Utc::now() + chrono::Duration::milliseconds(delay.as_millis() as i64);
                self.repo.reschedule(row.id, next_attempt_at, &error).await?;
                warn!(
                    outbox_id = %row.id,
                    recipient = %row.user_id,
                    attempts = row.attempts + 1,
                    retry_in_secs = delay.as_secs(),
                    error = %error,
                    "Notification delivery failed, rescheduled"
                );
                Ok(false)
            }
            Outcome::Dead { error } => {
                self.repo.mark_dead(row.id, &error).await?;
                record_notification_dead_lettered();
                error!(
                    outbox_id = %row.id,
                    recipient = %row.user_id,
                    kind = %message.kind,
                    titre = %message.titre,
                    attempts = row.attempts + 1,
                    error = %error,
                    "Notification dead-lettered"
                );
                Ok(true)
            }
        }
    }
}

#[async_trait::async_trait]
impl Job for NotificationOutboxJob {
    fn name(&self) -> &'static str {
        "notification_outbox"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.poll_interval_secs)
    }

    // Rows left pending by a previous process are picked up right away.
    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let rows = self
            .repo
            .claim_due(self.batch_size)
            .await
            .map_err(|e| format!("Failed to claim notifications: {}", e))?;

        if rows.is_empty() {
            return Ok(());
        }

        let mut finished = 0usize;
        for row in &rows {
            match self.process(row).await {
                Ok(true) => finished += 1,
                Ok(false) => {}
                // Row stays leased and comes back after the claim lease.
                Err(e) => {
                    warn!(outbox_id = %row.id, error = %e, "Failed to record delivery outcome")
                }
            }
        }

        info!(
            claimed = rows.len(),
            finished,
            batch_size = self.batch_size,
            "Processed notification outbox"
        );

        Ok(())
    }
}
