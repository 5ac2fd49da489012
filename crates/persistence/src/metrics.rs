//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Queries slower than this are logged.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(500);

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Called periodically by the database metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a repository query and records it on [`QueryTimer::record`].
///
/// ```ignore
/// let timer = QueryTimer::new("find_reservation_by_id");
/// let result = sqlx::query_as::<_, ReservationEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration, warning on slow queries.
    pub fn record(self) {
        let elapsed = self.start.elapsed();
        record_query_duration(self.query_name, elapsed.as_secs_f64());

        if elapsed >= SLOW_QUERY_THRESHOLD {
            counter!("database_slow_queries_total", "query" => self.query_name).increment(1);
            tracing::warn!(
                query = self.query_name,
                duration_ms = elapsed.as_millis() as u64,
                "Slow database query"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("find_plan_by_id");
        assert_eq!(timer.query_name, "find_plan_by_id");
        assert!(timer.start.elapsed() < SLOW_QUERY_THRESHOLD);
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        QueryTimer::new("list_active_plans").record();
    }
}
