//! In-app notification models and admin fan-out requests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Role;

/// Notification stored for a user and shown in the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub titre: String,
    pub message: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing the caller's notifications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Response for listing notifications.
#[derive(Debug, Clone, Serialize)]
pub struct ListNotificationsResponse {
    pub data: Vec<Notification>,
    pub unread_count: i64,
    pub pagination: shared::pagination::Pagination,
}

/// Response of the mark-as-read endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// Admin broadcast to every active user, optionally restricted to a role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(
        length(min = 1, max = 200, message = "Le titre doit contenir 1 à 200 caractères"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub titre: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Le message doit contenir 1 à 2000 caractères"
    ))]
    pub message: String,
    pub role: Option<Role>,
    pub data: Option<serde_json::Value>,
}

/// Admin notification to an explicit list of users.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TargetedNotificationRequest {
    #[validate(length(min = 1, max = 1000, message = "Entre 1 et 1000 destinataires"))]
    pub user_ids: Vec<Uuid>,
    #[validate(
        length(min = 1, max = 200, message = "Le titre doit contenir 1 à 200 caractères"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub titre: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Le message doit contenir 1 à 2000 caractères"
    ))]
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Admin notification rendered from a named template.
///
/// Recipients are `user_ids` when given, otherwise every active user
/// (restricted to `role` when set).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateNotificationRequest {
    #[validate(length(min = 1, max = 64))]
    pub template: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    pub user_ids: Option<Vec<Uuid>>,
    pub role: Option<Role>,
}

/// Result of an admin fan-out.
#[derive(Debug, Clone, Serialize)]
pub struct FanOutResponse {
    pub recipients: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_renamed() {
        let notification = Notification {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            notification_type: "reservation_acceptee".into(),
            titre: "Réservation confirmée".into(),
            message: "Votre réservation a été acceptée".into(),
            data: serde_json::json!({}),
            is_read: false,
            sent_at: Utc::now(),
            read_at: None,
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "reservation_acceptee");
        assert!(value.get("read_at").is_none());
    }

    #[test]
    fn test_broadcast_role_filter() {
        let req: BroadcastRequest = serde_json::from_str(
            r#"{"titre": "Info", "message": "Bonjour", "role": "prestataire"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Some(Role::Prestataire));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let req: BroadcastRequest =
            serde_json::from_str(r#"{"titre": "   ", "message": "Bonjour"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_targeted_requires_recipients() {
        let req: TargetedNotificationRequest =
            serde_json::from_str(r#"{"user_ids": [], "titre": "Info", "message": "Bonjour"}"#)
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_template_variables_default() {
        let req: TemplateNotificationRequest =
            serde_json::from_str(r#"{"template": "maintenance"}"#).unwrap();
        assert!(req.variables.is_empty());
        assert!(req.user_ids.is_none());
    }
}
