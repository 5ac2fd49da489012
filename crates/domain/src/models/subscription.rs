//! Provider subscription state and service quota.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What the quota guard needs to know about a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub prestataire_id: Uuid,
    /// `None` when the provider has no plan.
    pub max_services: Option<i32>,
    pub max_photos_par_service: Option<i32>,
    pub abonnement_expires_at: Option<DateTime<Utc>>,
    /// Non-deleted services, active or not.
    pub service_count: i64,
}

/// Result of a read-only quota evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaStatus {
    pub can_create: bool,
    pub services_used: i64,
    /// `None` means unlimited.
    pub services_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Current subscription of the calling provider.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub prestataire_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<super::Plan>,
    pub abonnement_expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub services_used: i64,
    pub services_limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_transaction: Option<super::WaveTransaction>,
}
