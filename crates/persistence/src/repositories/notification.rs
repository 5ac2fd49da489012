//! Notification repository: in-app notifications and the delivery outbox.

use chrono::{DateTime, Utc};
use domain::services::NotificationMessage;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{NotificationEntity, OutboxEntity, RoleDb};
use crate::metrics::QueryTimer;

/// How long a claimed outbox row stays invisible to other workers.
pub const CLAIM_LEASE_SECS: i64 = 300;

/// Repository for notification database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // In-app notifications

    /// Store an in-app notification for a user.
    pub async fn insert(
        &self,
        user_id: Uuid,
        message: &NotificationMessage,
    ) -> Result<NotificationEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_notification");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (user_id, type, titre, message, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, type AS notification_type, titre, message, data, is_read,
                      sent_at, read_at
            "#,
        )
        .bind(user_id)
        .bind(message.kind.as_str())
        .bind(&message.titre)
        .bind(&message.message)
        .bind(&message.data)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Records a push delivery of an in-app notification to each device
    /// token its recipient registered. Returns the number of rows written.
    pub async fn record_push_deliveries(&self, notification_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("record_push_deliveries");
        let result = sqlx::query(
            r#"
            INSERT INTO push_deliveries
                (notification_id, push_token_id, user_id, platform, titre, message, data)
            SELECT n.id, t.id, t.user_id, t.platform, n.titre, n.message, n.data
            FROM notifications n
            JOIN push_tokens t ON t.user_id = n.user_id
            WHERE n.id = $1
            ON CONFLICT (notification_id, push_token_id) DO NOTHING
            "#,
        )
        .bind(notification_id)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// A user's notifications, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT id, user_id, type AS notification_type, titre, message, data, is_read,
                   sent_at, read_at
            FROM notifications
            WHERE user_id = $1 AND ($2 = false OR is_read = false)
            ORDER BY sent_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count a user's notifications.
    pub async fn count_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_notifications");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE user_id = $1 AND ($2 = false OR is_read = false)
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_read");
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Mark every unread notification of the user as read.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_all_notifications_read");
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = NOW()
            WHERE user_id = $1 AND is_read = false
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    // Outbox

    /// Queue one notification for delivery.
    pub async fn enqueue(
        &self,
        user_id: Uuid,
        message: &NotificationMessage,
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("enqueue_notification");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO notification_outbox (user_id, type, titre, message, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(message.kind.as_str())
        .bind(&message.titre)
        .bind(&message.message)
        .bind(&message.data)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Queue a notification for every active user, optionally of one role.
    pub async fn enqueue_for_active_users(
        conn: &mut PgConnection,
        role: Option<RoleDb>,
        message: &NotificationMessage,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("enqueue_notification_broadcast");
        let result = sqlx::query(
            r#"
            INSERT INTO notification_outbox (user_id, type, titre, message, data)
            SELECT id, $2, $3, $4, $5
            FROM users
            WHERE is_active = true AND ($1::user_role IS NULL OR role = $1)
            "#,
        )
        .bind(role)
        .bind(message.kind.as_str())
        .bind(&message.titre)
        .bind(&message.message)
        .bind(&message.data)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Queue a notification for the active users among `user_ids`.
    pub async fn enqueue_for_users(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
        message: &NotificationMessage,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("enqueue_notification_targeted");
        let result = sqlx::query(
            r#"
            INSERT INTO notification_outbox (user_id, type, titre, message, data)
            SELECT id, $2, $3, $4, $5
            FROM users
            WHERE is_active = true AND id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .bind(message.kind.as_str())
        .bind(&message.titre)
        .bind(&message.message)
        .bind(&message.data)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Claim up to `limit` due rows.
    ///
    /// Claimed rows get their next attempt pushed by [`CLAIM_LEASE_SECS`]
    /// so that concurrent workers skip them; a crashed worker's rows come
    /// back once the lease runs out.
    pub async fn claim_due(&self, limit: i64) -> Result<Vec<OutboxEntity>, sqlx::Error> {
        let timer = QueryTimer::new("claim_due_notifications");
        let result = sqlx::query_as::<_, OutboxEntity>(
            r#"
            UPDATE notification_outbox
            SET next_attempt_at = NOW() + make_interval(secs => $2)
            WHERE id IN (
                SELECT id FROM notification_outbox
                WHERE status = 'pending' AND next_attempt_at <= NOW()
                ORDER BY next_attempt_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, user_id, type AS notification_type, titre, message, data, status,
                      attempts, next_attempt_at, last_error, created_at, delivered_at
            "#,
        )
        .bind(limit)
        .bind(CLAIM_LEASE_SECS as f64)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn mark_delivered(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_delivered");
        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET status = 'delivered', attempts = attempts + 1, delivered_at = NOW(),
                last_error = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Record a failed attempt and schedule the next one.
    pub async fn reschedule(
        &self,
        id: Uuid,
        next_attempt_at: DateTime<Utc>,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("reschedule_notification");
        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET attempts = attempts + 1, next_attempt_at = $2, last_error = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(next_attempt_at)
        .bind(error)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Give up on a row after its last failed attempt.
    pub async fn mark_dead(&self, id: Uuid, error: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_dead");
        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET status = 'dead', attempts = attempts + 1, last_error = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Rows waiting for delivery and rows given up on, for backlog gauges.
    pub async fn outbox_backlog(&self) -> Result<(i64, i64), sqlx::Error> {
        let timer = QueryTimer::new("outbox_backlog");
        let result = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'dead')
            FROM notification_outbox
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
