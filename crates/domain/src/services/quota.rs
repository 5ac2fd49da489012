//! Service quota guard.
//!
//! A provider may create a service only while its subscription runs and
//! its plan's `max_services` is not reached. A negative limit means
//! unlimited. Deleted services do not count; inactive ones do.

use chrono::{DateTime, Utc};

use crate::errors::DomainError;
use crate::models::plan::service_limit;
use crate::models::{QuotaSnapshot, QuotaStatus};

/// Checks that the provider described by `snapshot` can add one service.
pub fn check_can_create_service(
    snapshot: &QuotaSnapshot,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    let max = match (snapshot.max_services, snapshot.abonnement_expires_at) {
        (Some(max), Some(expires_at)) if expires_at > now => max,
        _ => return Err(DomainError::SubscriptionExpired),
    };

    match service_limit(max) {
        Some(limit) if snapshot.service_count >= i64::from(limit) => {
            Err(DomainError::QuotaExceeded(limit))
        }
        _ => Ok(()),
    }
}

/// Read-only evaluation of the guard.
pub fn quota_status(snapshot: &QuotaSnapshot, now: DateTime<Utc>) -> QuotaStatus {
    let check = check_can_create_service(snapshot, now);
    QuotaStatus {
        can_create: check.is_ok(),
        services_used: snapshot.service_count,
        services_limit: snapshot.max_services.and_then(service_limit),
        reason: check.err().map(|e| e.to_string()),
    }
}

/// True when the subscription is missing or over.
pub fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.map(|at| at <= now).unwrap_or(true)
}
