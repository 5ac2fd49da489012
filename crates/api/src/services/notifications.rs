//! Notification dispatch and delivery.
//!
//! Workflows call [`NotificationDispatcher::notify`] after their transaction
//! commits; it only enqueues an outbox row. The outbox job later hands each
//! row to a [`NotificationService`], normally [`PgNotificationService`].

use async_trait::async_trait;
use domain::models::notification::{
    BroadcastRequest, FanOutResponse, ListNotificationsQuery, ListNotificationsResponse,
    MarkReadResponse, TargetedNotificationRequest, TemplateNotificationRequest,
};
use domain::models::{AdminAction, Role};
use domain::services::{
    admin_log_helpers, NotificationKind, NotificationMessage, NotificationResult,
    NotificationService, NotificationTemplate,
};
use persistence::repositories::{AdminLogRepository, NotificationRepository, UserRepository};
use shared::pagination::{PageRequest, Pagination};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Best-effort enqueue of notifications into the outbox.
#[derive(Clone)]
pub struct NotificationDispatcher {
    repo: NotificationRepository,
}

impl NotificationDispatcher {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: NotificationRepository::new(pool),
        }
    }

    /// Enqueue `message` for `recipient`. Failures are logged and swallowed.
    pub async fn notify(&self, recipient: Uuid, message: NotificationMessage) {
        match self.repo.enqueue(recipient, &message).await {
            Ok(outbox_id) => debug!(
                outbox_id = %outbox_id,
                recipient = %recipient,
                kind = %message.kind,
                "Notification enqueued"
            ),
            Err(e) => warn!(
                recipient = %recipient,
                kind = %message.kind,
                error = %e,
                "Failed to enqueue notification"
            ),
        }
    }
}

/// Delivers a message as an in-app notification plus a push record per
/// registered device token.
pub struct PgNotificationService {
    users: UserRepository,
    notifications: NotificationRepository,
}

impl PgNotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }
}

#[async_trait]
impl NotificationService for PgNotificationService {
    async fn deliver(&self, recipient: Uuid, message: &NotificationMessage) -> NotificationResult {
        let user = match self.users.find_by_id(recipient).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => {
                debug!(recipient = %recipient, "Recipient missing or inactive, skipping");
                return NotificationResult::Skipped;
            }
            Err(e) => return NotificationResult::Failed(e.to_string()),
        };

        let notification = match self.notifications.insert(user.id, message).await {
            Ok(notification) => notification,
            Err(e) => return NotificationResult::Failed(e.to_string()),
        };

        match self.notifications.record_push_deliveries(notification.id).await {
            Ok(0) => NotificationResult::NoToken,
            Ok(devices) => {
                info!(
                    recipient = %recipient,
                    notification_id = %notification.id,
                    kind = %message.kind,
                    devices,
                    "Push deliveries recorded"
                );
                NotificationResult::Sent
            }
            Err(e) => {
                // In-app row already stored: no redelivery.
                warn!(
                    recipient = %recipient,
                    notification_id = %notification.id,
                    error = %e,
                    "Failed to record push deliveries"
                );
                NotificationResult::NoToken
            }
        }
    }
}

/// Who an admin fan-out goes to.
enum Audience<'a> {
    Active(Option<Role>),
    Users(&'a [Uuid]),
}

/// In-app notification inbox and admin fan-out.
#[derive(Clone)]
pub struct NotificationCenter {
    pool: PgPool,
    notifications: NotificationRepository,
}

impl NotificationCenter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list(
        &self,
        auth: &AuthUser,
        query: ListNotificationsQuery,
    ) -> Result<ListNotificationsResponse, ApiError> {
        let page = PageRequest::new(query.page, query.per_page);
        let rows = self
            .notifications
            .list_for_user(auth.user_id, query.unread_only, page.limit(), page.offset())
            .await?;
        let total = self
            .notifications
            .count_for_user(auth.user_id, query.unread_only)
            .await?;
        let unread_count = if query.unread_only {
            total
        } else {
            self.notifications.count_for_user(auth.user_id, true).await?
        };

        Ok(ListNotificationsResponse {
            data: rows.into_iter().map(Into::into).collect(),
            unread_count,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn mark_read(&self, auth: &AuthUser, id: Uuid) -> Result<MarkReadResponse, ApiError> {
        match self.notifications.mark_read(id, auth.user_id).await? {
            0 => Err(ApiError::NotFound("Notification introuvable".into())),
            updated => Ok(MarkReadResponse { updated }),
        }
    }

    pub async fn mark_all_read(&self, auth: &AuthUser) -> Result<MarkReadResponse, ApiError> {
        let updated = self.notifications.mark_all_read(auth.user_id).await?;
        Ok(MarkReadResponse { updated })
    }

    /// Announcement to every active user, optionally of one role.
    pub async fn broadcast(
        &self,
        auth: &AuthUser,
        request: BroadcastRequest,
    ) -> Result<FanOutResponse, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let message = announcement(request.titre, request.message, request.data);
        self.fan_out(
            auth,
            AdminAction::BroadcastNotification,
            Audience::Active(request.role),
            &message,
        )
        .await
    }

    /// Announcement to the active users among an explicit list.
    pub async fn targeted(
        &self,
        auth: &AuthUser,
        request: TargetedNotificationRequest,
    ) -> Result<FanOutResponse, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let message = announcement(request.titre, request.message, request.data);
        self.fan_out(
            auth,
            AdminAction::TargetedNotification,
            Audience::Users(&request.user_ids),
            &message,
        )
        .await
    }

    /// Announcement rendered from a named template.
    pub async fn template(
        &self,
        auth: &AuthUser,
        request: TemplateNotificationRequest,
    ) -> Result<FanOutResponse, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let template = NotificationTemplate::from_code(&request.template)?;
        let message = template.render(&request.variables)?;

        let audience = match request.user_ids.as_deref() {
            Some(ids) if !ids.is_empty() => Audience::Users(ids),
            _ => Audience::Active(request.role),
        };
        self.fan_out(auth, AdminAction::TemplateNotification, audience, &message)
            .await
    }

    /// Enqueues the message for the audience and logs the admin action in
    /// one transaction.
    async fn fan_out(
        &self,
        auth: &AuthUser,
        action: AdminAction,
        audience: Audience<'_>,
        message: &NotificationMessage,
    ) -> Result<FanOutResponse, ApiError> {
        let mut tx = self.pool.begin().await?;

        let recipients = match audience {
            Audience::Active(role) => {
                NotificationRepository::enqueue_for_active_users(
                    &mut *tx,
                    role.map(Into::into),
                    message,
                )
                .await?
            }
            Audience::Users(ids) => {
                NotificationRepository::enqueue_for_users(&mut *tx, ids, message).await?
            }
        };

        AdminLogRepository::insert(
            &mut *tx,
            &admin_log_helpers::fan_out(auth.user_id, action, recipients, &message.titre),
        )
        .await?;

        tx.commit().await?;

        info!(
            admin_id = %auth.user_id,
            action = %action,
            recipients,
            "Admin notification enqueued"
        );

        Ok(FanOutResponse { recipients })
    }
}

fn announcement(
    titre: String,
    message: String,
    data: Option<serde_json::Value>,
) -> NotificationMessage {
    let message = NotificationMessage::new(NotificationKind::Annonce, titre, message);
    match data {
        Some(data) => message.with_data(data),
        None => message,
    }
}
