//! Notification entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::Notification;
use domain::services::{NotificationKind, NotificationMessage};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub titre: String,
    pub message: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<NotificationEntity> for Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            notification_type: entity.notification_type,
            titre: entity.titre,
            message: entity.message,
            data: entity.data,
            is_read: entity.is_read,
            sent_at: entity.sent_at,
            read_at: entity.read_at,
        }
    }
}

/// Database enum for outbox row status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "outbox_status", rename_all = "lowercase")]
pub enum OutboxStatusDb {
    Pending,
    Delivered,
    Dead,
}

/// Database row mapping for the notification_outbox table.
#[derive(Debug, Clone, FromRow)]
pub struct OutboxEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub titre: String,
    pub message: String,
    pub data: serde_json::Value,
    pub status: OutboxStatusDb,
    pub attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl OutboxEntity {
    /// Rebuilds the message to deliver. Unknown stored types fall back to
    /// an announcement so that a renamed kind never blocks delivery.
    pub fn to_message(&self) -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::from_str(&self.notification_type)
                .unwrap_or(NotificationKind::Annonce),
            titre: self.titre.clone(),
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }
}
