//! Domain error types.
//!
//! Business rule failures shared by every workflow. Messages are the ones
//! shown to PrestaCI users, so they stay in French.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{ReservationAction, ReservationStatus};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Action '{action}' impossible depuis le statut '{from}'")]
    InvalidTransition {
        from: ReservationStatus,
        action: ReservationAction,
    },

    #[error("{0}")]
    InvalidState(String),

    #[error("Votre abonnement a expiré")]
    SubscriptionExpired,

    #[error("Limite de services atteinte ({0})")]
    QuotaExceeded(i32),

    #[error("Montant incorrect: {expected} attendu")]
    AmountMismatch { expected: Decimal },

    #[error("Une demande d'abonnement est déjà en attente de validation")]
    DuplicatePendingRequest,

    #[error("Vous avez déjà laissé un avis pour cette réservation")]
    DuplicateReview,
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
