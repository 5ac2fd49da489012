//! Reservation domain models and lifecycle.
//!
//! A reservation moves through a small state machine:
//!
//! ```text
//! en_attente ──accept──▶ confirmee ──complete──▶ terminee
//!     │                      │
//!     ├──reject / cancel─────┴──▶ refusee / annulee
//! ```
//!
//! `terminee`, `annulee` and `refusee` are terminal.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::DomainError;
use crate::models::Role;

/// Reservation status, mirroring the `statuts_reservation` lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    EnAttente,
    Confirmee,
    Terminee,
    Annulee,
    Refusee,
}

impl ReservationStatus {
    pub fn code(self) -> &'static str {
        match self {
            ReservationStatus::EnAttente => "en_attente",
            ReservationStatus::Confirmee => "confirmee",
            ReservationStatus::Terminee => "terminee",
            ReservationStatus::Annulee => "annulee",
            ReservationStatus::Refusee => "refusee",
        }
    }

    /// Status reached by applying `action`, or `InvalidTransition`.
    pub fn apply(self, action: ReservationAction) -> Result<ReservationStatus, DomainError> {
        use ReservationAction::*;
        use ReservationStatus::*;

        match (self, action) {
            (EnAttente, Accept) => Ok(Confirmee),
            (EnAttente | Confirmee, Reject) => Ok(Refusee),
            (Confirmee, Complete) => Ok(Terminee),
            (EnAttente | Confirmee, Cancel) => Ok(Annulee),
            (from, action) => Err(DomainError::InvalidTransition { from, action }),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Actions that move a reservation between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationAction {
    Accept,
    Reject,
    Complete,
    Cancel,
}

impl ReservationAction {
    /// Role allowed to perform the action.
    pub fn actor_role(self) -> Role {
        match self {
            ReservationAction::Cancel => Role::Client,
            _ => Role::Prestataire,
        }
    }

    /// History comment used when the actor gives none.
    pub fn default_comment(self) -> &'static str {
        match self {
            ReservationAction::Accept => "Réservation acceptée par le prestataire",
            ReservationAction::Reject => "Réservation refusée par le prestataire",
            ReservationAction::Complete => "Prestation terminée",
            ReservationAction::Cancel => "Réservation annulée par le client",
        }
    }

    /// Builds the history comment, appending the actor's reason if any.
    pub fn comment_with_reason(self, reason: Option<&str>) -> String {
        match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("{}: {}", self.default_comment(), reason),
            None => self.default_comment().to_string(),
        }
    }
}

impl std::fmt::Display for ReservationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationAction::Accept => write!(f, "accepter"),
            ReservationAction::Reject => write!(f, "refuser"),
            ReservationAction::Complete => write!(f, "terminer"),
            ReservationAction::Cancel => write!(f, "annuler"),
        }
    }
}

/// Reservation as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub client_id: Uuid,
    pub prestataire_id: Uuid,
    pub service_id: Uuid,
    pub statut: ReservationStatus,
    pub date_reservation: NaiveDate,
    #[serde(with = "shared::time::hhmm")]
    pub heure_debut: NaiveTime,
    #[serde(with = "shared::time::hhmm")]
    pub heure_fin: NaiveTime,
    pub prix_final: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_client: Option<String>,
    pub a_domicile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adresse_intervention: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the append-only reservation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationHistoryEntry {
    pub id: Uuid,
    pub reservation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ancien_statut: Option<ReservationStatus>,
    pub nouveau_statut: ReservationStatus,
    pub commentaire: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request body for booking a service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub service_id: Uuid,
    pub date_reservation: NaiveDate,
    #[serde(with = "shared::time::hhmm")]
    pub heure_debut: NaiveTime,
    #[validate(length(max = 1000, message = "Les notes ne peuvent dépasser 1000 caractères"))]
    pub notes_client: Option<String>,
    #[serde(default)]
    pub a_domicile: bool,
    #[validate(length(max = 500, message = "Adresse trop longue"))]
    pub adresse_intervention: Option<String>,
}

impl CreateReservationRequest {
    /// A home visit needs an address.
    pub fn check_home_visit(&self) -> Result<(), DomainError> {
        if self.a_domicile && shared::validation::is_blank(self.adresse_intervention.as_deref()) {
            return Err(DomainError::validation(
                "L'adresse d'intervention est requise pour une prestation à domicile",
            ));
        }
        Ok(())
    }
}

/// Body accepted by reject and cancel.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TransitionRequest {
    #[validate(length(max = 500, message = "Le motif ne peut dépasser 500 caractères"))]
    pub motif: Option<String>,
}

/// Which side of the reservation the caller is listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationView {
    Client(Uuid),
    Prestataire(Uuid),
}

/// Query parameters for listing reservations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReservationsQuery {
    pub statut: Option<ReservationStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Response for listing reservations.
#[derive(Debug, Clone, Serialize)]
pub struct ListReservationsResponse {
    pub data: Vec<Reservation>,
    pub pagination: shared::pagination::Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReservationAction::*;
    use ReservationStatus::*;

    const ALL_STATUSES: [ReservationStatus; 5] = [EnAttente, Confirmee, Terminee, Annulee, Refusee];

    #[test]
    fn test_accept_only_from_pending() {
        assert_eq!(EnAttente.apply(Accept), Ok(Confirmee));
        for status in ALL_STATUSES.into_iter().filter(|s| *s != EnAttente) {
            assert_eq!(
                status.apply(Accept),
                Err(DomainError::InvalidTransition {
                    from: status,
                    action: Accept
                })
            );
        }
    }

    #[test]
    fn test_reject_from_pending_or_confirmed() {
        assert_eq!(EnAttente.apply(Reject), Ok(Refusee));
        assert_eq!(Confirmee.apply(Reject), Ok(Refusee));
        assert!(Terminee.apply(Reject).is_err());
        assert!(Annulee.apply(Reject).is_err());
        assert!(Refusee.apply(Reject).is_err());
    }

    #[test]
    fn test_complete_only_from_confirmed() {
        assert_eq!(Confirmee.apply(Complete), Ok(Terminee));
        for status in ALL_STATUSES.into_iter().filter(|s| *s != Confirmee) {
            assert!(status.apply(Complete).is_err());
        }
    }

    #[test]
    fn test_cancel_from_non_terminal() {
        assert_eq!(EnAttente.apply(Cancel), Ok(Annulee));
        assert_eq!(Confirmee.apply(Cancel), Ok(Annulee));
        for status in [Terminee, Annulee, Refusee] {
            assert!(status.apply(Cancel).is_err());
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for status in [Terminee, Annulee, Refusee] {
            for action in [Accept, Reject, Complete, Cancel] {
                assert!(status.apply(action).is_err(), "{status} + {action}");
            }
        }
    }

    #[test]
    fn test_status_serde_codes() {
        assert_eq!(serde_json::to_string(&EnAttente).unwrap(), "\"en_attente\"");
        let s: ReservationStatus = serde_json::from_str("\"terminee\"").unwrap();
        assert_eq!(s, Terminee);
    }

    #[test]
    fn test_actor_roles() {
        assert_eq!(Accept.actor_role(), Role::Prestataire);
        assert_eq!(Reject.actor_role(), Role::Prestataire);
        assert_eq!(Complete.actor_role(), Role::Prestataire);
        assert_eq!(Cancel.actor_role(), Role::Client);
    }

    #[test]
    fn test_comment_with_reason() {
        assert_eq!(
            Reject.comment_with_reason(Some("Indisponible")),
            "Réservation refusée par le prestataire: Indisponible"
        );
        assert_eq!(
            Reject.comment_with_reason(Some("   ")),
            Reject.default_comment()
        );
        assert_eq!(Accept.comment_with_reason(None), Accept.default_comment());
    }

    #[test]
    fn test_create_request_deserialize() {
        let json = r#"{
            "service_id": "550e8400-e29b-41d4-a716-446655440000",
            "date_reservation": "2026-11-02",
            "heure_debut": "14:00"
        }"#;
        let req: CreateReservationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.heure_debut, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert!(!req.a_domicile);
        assert!(req.validate().is_ok());
        assert!(req.check_home_visit().is_ok());
    }

    #[test]
    fn test_home_visit_requires_address() {
        let json = r#"{
            "service_id": "550e8400-e29b-41d4-a716-446655440000",
            "date_reservation": "2026-11-02",
            "heure_debut": "09:30",
            "a_domicile": true
        }"#;
        let req: CreateReservationRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(
            req.check_home_visit(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_reservation_serializes_times_as_hhmm() {
        let reservation = Reservation {
            id: Uuid::nil(),
            client_id: Uuid::nil(),
            prestataire_id: Uuid::nil(),
            service_id: Uuid::nil(),
            statut: EnAttente,
            date_reservation: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            heure_debut: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            heure_fin: NaiveTime::from_hms_opt(14, 45, 0).unwrap(),
            prix_final: Decimal::from(3000),
            notes_client: None,
            a_domicile: false,
            adresse_intervention: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&reservation).unwrap();
        assert_eq!(value["heure_fin"], "14:45");
        assert_eq!(value["statut"], "en_attente");
        assert_eq!(value["prix_final"].as_f64(), Some(3000.0));
        assert!(value.get("notes_client").is_none());
    }
}
