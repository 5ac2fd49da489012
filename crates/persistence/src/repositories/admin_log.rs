//! Admin log repository.
//!
//! Only the transactional insert exists: rows are written by the admin
//! workflows in the same transaction as the change they describe.

use domain::models::NewAdminLog;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::metrics::QueryTimer;

/// Repository for admin log database operations.
pub struct AdminLogRepository;

impl AdminLogRepository {
    /// Append an admin log entry.
    pub async fn insert(conn: &mut PgConnection, entry: &NewAdminLog) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("insert_admin_log");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO admin_logs (admin_id, action, target_type, target_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.admin_id)
        .bind(entry.action.as_str())
        .bind(&entry.target_type)
        .bind(entry.target_id)
        .bind(&entry.details)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }
}
