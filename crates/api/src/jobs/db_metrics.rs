//! Periodic database gauges: connection pool usage and outbox backlog.

use persistence::repositories::NotificationRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_outbox_backlog;

pub struct DatabaseMetricsJob {
    pool: PgPool,
    notifications: NotificationRepository,
}

impl DatabaseMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait::async_trait]
impl Job for DatabaseMetricsJob {
    fn name(&self) -> &'static str {
        "db_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(15)
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);

        let (pending, dead) = self
            .notifications
            .outbox_backlog()
            .await
            .map_err(|e| format!("Failed to count outbox rows: {}", e))?;
        record_outbox_backlog(pending, dead);
        Ok(())
    }
}
