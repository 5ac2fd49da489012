//! Notification contracts.
//!
//! Workflows describe what to tell a user with a [`NotificationMessage`];
//! a [`NotificationService`] delivers it. Delivery runs after the business
//! transaction commits and never decides its outcome.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::errors::DomainError;
use crate::models::{Reservation, ReservationAction};

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NouvelleReservation,
    ReservationAcceptee,
    ReservationRefusee,
    ReservationTerminee,
    ReservationAnnulee,
    AbonnementActive,
    PaiementRejete,
    NouvelAvis,
    AvisApprouve,
    AvisRejete,
    Annonce,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NouvelleReservation => "nouvelle_reservation",
            NotificationKind::ReservationAcceptee => "reservation_acceptee",
            NotificationKind::ReservationRefusee => "reservation_refusee",
            NotificationKind::ReservationTerminee => "reservation_terminee",
            NotificationKind::ReservationAnnulee => "reservation_annulee",
            NotificationKind::AbonnementActive => "abonnement_active",
            NotificationKind::PaiementRejete => "paiement_rejete",
            NotificationKind::NouvelAvis => "nouvel_avis",
            NotificationKind::AvisApprouve => "avis_approuve",
            NotificationKind::AvisRejete => "avis_rejete",
            NotificationKind::Annonce => "annonce",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("Unknown notification type: {}", s))
    }
}

/// Content of a notification, independent of its recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub kind: NotificationKind,
    pub titre: String,
    pub message: String,
    pub data: serde_json::Value,
}

impl NotificationMessage {
    pub fn new(
        kind: NotificationKind,
        titre: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            titre: titre.into(),
            message: message.into(),
            data: json!({}),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Sent to the provider when a client books.
    pub fn reservation_created(reservation: &Reservation) -> Self {
        Self::new(
            NotificationKind::NouvelleReservation,
            "Nouvelle réservation",
            format!(
                "Vous avez une nouvelle réservation le {} à {}",
                reservation.date_reservation.format("%d/%m/%Y"),
                shared::time::format_hhmm(reservation.heure_debut)
            ),
        )
        .with_data(json!({ "reservation_id": reservation.id }))
    }

    /// Sent after a status change, to the party that did not act.
    pub fn reservation_transition(
        reservation: &Reservation,
        action: ReservationAction,
        reason: Option<&str>,
    ) -> Self {
        let (kind, titre, base) = match action {
            ReservationAction::Accept => (
                NotificationKind::ReservationAcceptee,
                "Réservation confirmée",
                "Votre réservation a été acceptée par le prestataire",
            ),
            ReservationAction::Reject => (
                NotificationKind::ReservationRefusee,
                "Réservation refusée",
                "Votre réservation a été refusée par le prestataire",
            ),
            ReservationAction::Complete => (
                NotificationKind::ReservationTerminee,
                "Prestation terminée",
                "Votre prestation est terminée. Donnez votre avis !",
            ),
            ReservationAction::Cancel => (
                NotificationKind::ReservationAnnulee,
                "Réservation annulée",
                "Une réservation a été annulée par le client",
            ),
        };

        let message = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("{}. Motif : {}", base, reason),
            None => base.to_string(),
        };

        Self::new(kind, titre, message).with_data(json!({
            "reservation_id": reservation.id,
            "statut": reservation.statut,
        }))
    }

    pub fn subscription_activated(
        plan_nom: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self::new(
            NotificationKind::AbonnementActive,
            "Abonnement activé",
            format!(
                "Votre abonnement {} est actif jusqu'au {}",
                plan_nom,
                expires_at.format("%d/%m/%Y")
            ),
        )
        .with_data(json!({ "abonnement_expires_at": expires_at }))
    }

    pub fn payment_rejected(transaction_id: Uuid, motif: &str) -> Self {
        Self::new(
            NotificationKind::PaiementRejete,
            "Paiement rejeté",
            format!("Votre paiement Wave a été rejeté. Motif : {}", motif),
        )
        .with_data(json!({ "transaction_id": transaction_id }))
    }

    pub fn review_received(avis_id: Uuid, note: i32) -> Self {
        Self::new(
            NotificationKind::NouvelAvis,
            "Nouvel avis",
            format!("Un client vous a attribué la note de {}/5", note),
        )
        .with_data(json!({ "avis_id": avis_id }))
    }

    pub fn review_approved(avis_id: Uuid) -> Self {
        Self::new(
            NotificationKind::AvisApprouve,
            "Avis publié",
            "Un avis a été approuvé et est désormais visible",
        )
        .with_data(json!({ "avis_id": avis_id }))
    }

    pub fn review_rejected(avis_id: Uuid, reason: Option<&str>) -> Self {
        let message = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("Votre avis n'a pas été publié. Motif : {}", reason),
            None => "Votre avis n'a pas été publié".to_string(),
        };
        Self::new(NotificationKind::AvisRejete, "Avis non publié", message)
            .with_data(json!({ "avis_id": avis_id }))
    }
}

/// Predefined announcements an admin can send by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTemplate {
    Maintenance,
    ExpirationAbonnement,
    NouvelleFonctionnalite,
    Promotion,
}

impl NotificationTemplate {
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "maintenance" => Ok(NotificationTemplate::Maintenance),
            "expiration_abonnement" => Ok(NotificationTemplate::ExpirationAbonnement),
            "nouvelle_fonctionnalite" => Ok(NotificationTemplate::NouvelleFonctionnalite),
            "promotion" => Ok(NotificationTemplate::Promotion),
            other => Err(DomainError::not_found(format!(
                "Modèle de notification inconnu: {}",
                other
            ))),
        }
    }

    fn parts(&self) -> (&'static str, &'static str) {
        match self {
            NotificationTemplate::Maintenance => (
                "Maintenance planifiée",
                "PrestaCI sera indisponible le {date} de {debut} à {fin}.",
            ),
            NotificationTemplate::ExpirationAbonnement => (
                "Votre abonnement expire bientôt",
                "Votre abonnement {plan} expire le {date}. Pensez à le renouveler.",
            ),
            NotificationTemplate::NouvelleFonctionnalite => {
                ("Nouveauté sur PrestaCI", "{fonctionnalite} : {description}")
            }
            NotificationTemplate::Promotion => ("{titre}", "{message}"),
        }
    }

    /// Fills `{placeholder}` variables. Every placeholder must be provided.
    pub fn render(
        &self,
        variables: &HashMap<String, String>,
    ) -> Result<NotificationMessage, DomainError> {
        let (titre, message) = self.parts();
        Ok(NotificationMessage::new(
            NotificationKind::Annonce,
            render_placeholders(titre, variables)?,
            render_placeholders(message, variables)?,
        ))
    }
}

fn render_placeholders(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, DomainError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| DomainError::validation("Modèle de notification mal formé"))?;
        let name = &after[..end];
        let value = variables
            .get(name)
            .ok_or_else(|| DomainError::validation(format!("Variable manquante: {}", name)))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationResult {
    /// Stored in-app and pushed to at least one device.
    Sent,
    /// Stored in-app; the user has no push token registered.
    NoToken,
    /// Delivery failed and should be retried.
    Failed(String),
    /// Recipient is inactive or unknown.
    Skipped,
}

/// Delivers notifications to one user.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn deliver(&self, recipient: Uuid, message: &NotificationMessage) -> NotificationResult;
}

/// Mock notification service for development and testing.
///
/// Records deliveries instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    delivered: Arc<Mutex<Vec<(Uuid, NotificationMessage)>>>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<(Uuid, NotificationMessage)> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn deliver(&self, recipient: Uuid, message: &NotificationMessage) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                recipient = %recipient,
                kind = %message.kind,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            recipient = %recipient,
            kind = %message.kind,
            titre = %message.titre,
            "Mock: Would deliver notification"
        );

        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push((recipient, message.clone()));
        }
        NotificationResult::Sent
    }
}
