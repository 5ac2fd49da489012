//! Wave subscription payment rules.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::errors::DomainError;
use crate::models::wave_transaction::SubmitWaveTransactionRequest;
use crate::models::Plan;

pub const REJECTION_REASON_REQUIRED: &str = "Le motif de rejet est requis";

/// Longest subscription a single payment may buy.
pub const MAX_SUBSCRIPTION_DAYS: i32 = 3650;

/// Amount a provider owes for `days` of `plan`.
pub fn expected_amount(plan: &Plan, days: i32) -> Decimal {
    shared::money::prorated_price(plan.prix, i64::from(days))
}

/// Checks a submission against its plan and returns the expected amount.
///
/// The pending-transaction rule needs storage and is enforced by the caller.
pub fn check_submission(
    plan: &Plan,
    request: &SubmitWaveTransactionRequest,
) -> Result<Decimal, DomainError> {
    if !plan.is_active {
        return Err(DomainError::not_found("Plan introuvable"));
    }
    if request.duree_jours <= 0 {
        return Err(DomainError::validation(
            "La durée d'abonnement doit être positive",
        ));
    }
    if request.duree_jours > MAX_SUBSCRIPTION_DAYS {
        return Err(DomainError::validation(format!(
            "La durée d'abonnement ne peut dépasser {MAX_SUBSCRIPTION_DAYS} jours"
        )));
    }

    let expected = expected_amount(plan, request.duree_jours);
    if request.montant != expected {
        return Err(DomainError::AmountMismatch { expected });
    }

    Ok(expected)
}

/// Returns the trimmed rejection reason, or the validation error.
pub fn require_rejection_reason(reason: Option<&str>) -> Result<String, DomainError> {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => Ok(reason.to_string()),
        _ => Err(DomainError::validation(REJECTION_REASON_REQUIRED)),
    }
}

/// Subscription end once a validated transaction is applied.
pub fn subscription_expiry(
    validated_at: DateTime<Utc>,
    days: i32,
) -> Result<DateTime<Utc>, DomainError> {
    Duration::try_days(i64::from(days))
        .and_then(|span| validated_at.checked_add_signed(span))
        .ok_or_else(|| DomainError::validation("Durée d'abonnement hors limites"))
}
