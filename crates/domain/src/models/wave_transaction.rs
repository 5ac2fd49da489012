//! Wave mobile-money transaction models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Status of a provider's payment claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    EnAttente,
    Valide,
    Rejete,
}

impl std::fmt::Display for WaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaveStatus::EnAttente => write!(f, "en_attente"),
            WaveStatus::Valide => write!(f, "valide"),
            WaveStatus::Rejete => write!(f, "rejete"),
        }
    }
}

/// A payment claim as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveTransaction {
    pub id: Uuid,
    pub prestataire_id: Uuid,
    pub plan_id: Uuid,
    pub wave_transaction_id: String,
    pub montant: Decimal,
    pub devise: String,
    pub duree_abonnement_jours: i32,
    pub statut: WaveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motif_rejet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

lazy_static::lazy_static! {
    /// Wave receipts carry ids like `T_ABC123XYZ`.
    pub static ref WAVE_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_\-]{4,64}$").unwrap();
}

fn validate_wave_id(value: &str) -> Result<(), validator::ValidationError> {
    if WAVE_ID_REGEX.is_match(value.trim()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("wave_id_format").with_message(
            std::borrow::Cow::Borrowed("Identifiant de transaction Wave invalide"),
        ))
    }
}

/// Provider request for a subscription paid through Wave.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitWaveTransactionRequest {
    pub plan_id: Uuid,
    #[validate(custom(function = "validate_wave_id"))]
    pub wave_transaction_id: String,
    pub montant: Decimal,
    #[validate(range(
        min = 1,
        max = 3650,
        message = "La durée doit être comprise entre 1 et 3650 jours"
    ))]
    pub duree_jours: i32,
}

/// Admin rejection body. The reason is mandatory but checked by the
/// workflow so that a missing field and a blank one yield the same error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectWaveTransactionRequest {
    pub motif_rejet: Option<String>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListWaveTransactionsQuery {
    pub statut: Option<WaveStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Response for listing transactions.
#[derive(Debug, Clone, Serialize)]
pub struct ListWaveTransactionsResponse {
    pub data: Vec<WaveTransaction>,
    pub pagination: shared::pagination::Pagination,
}

/// Response after an admin validates a transaction.
#[derive(Debug, Clone, Serialize)]
pub struct WaveValidationResponse {
    pub transaction: WaveTransaction,
    pub plan_actuel_id: Uuid,
    pub abonnement_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_duration_bounds() {
        let request = |duree_jours| SubmitWaveTransactionRequest {
            plan_id: Uuid::new_v4(),
            wave_transaction_id: "T_ABC123XYZ".into(),
            montant: Decimal::from(5000),
            duree_jours,
        };
        assert!(request(30).validate().is_ok());
        assert!(request(3650).validate().is_ok());
        assert!(request(0).validate().is_err());
        assert!(request(3651).validate().is_err());
        assert!(request(100_000_000).validate().is_err());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&WaveStatus::EnAttente).unwrap(),
            "\"en_attente\""
        );
        let s: WaveStatus = serde_json::from_str("\"rejete\"").unwrap();
        assert_eq!(s, WaveStatus::Rejete);
    }

    #[test]
    fn test_wave_id_format() {
        assert!(WAVE_ID_REGEX.is_match("T_ABC123XYZ"));
        assert!(WAVE_ID_REGEX.is_match("wave-2026-0001"));
        assert!(!WAVE_ID_REGEX.is_match("abc"));
        assert!(!WAVE_ID_REGEX.is_match("T ABC 123"));
    }

    #[test]
    fn test_submit_request_validation() {
        let json = r#"{
            "plan_id": "550e8400-e29b-41d4-a716-446655440000",
            "wave_transaction_id": "T_ABC123XYZ",
            "montant": 15000,
            "duree_jours": 90
        }"#;
        let req: SubmitWaveTransactionRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.montant, Decimal::from(15000));

        let bad = SubmitWaveTransactionRequest {
            wave_transaction_id: "!!".into(),
            ..req
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reject_request_reason_optional_in_body() {
        let req: RejectWaveTransactionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.motif_rejet.is_none());
    }
}
