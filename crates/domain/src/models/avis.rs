//! Review (avis) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A client's rating of a completed reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avis {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub client_id: Uuid,
    pub prestataire_id: Uuid,
    pub service_id: Uuid,
    pub note: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
    pub photos: Vec<String>,
    pub is_moderated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Denormalized rating cache of a provider or a service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub note_moyenne: f64,
    pub nombre_avis: i32,
}

/// Client request to review a reservation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAvisRequest {
    pub reservation_id: Uuid,
    pub note: i32,
    #[validate(length(max = 2000, message = "Commentaire trop long"))]
    pub commentaire: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5, message = "Au plus 5 photos par avis"))]
    pub photos: Vec<String>,
}

/// Response after creating a review.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAvisResponse {
    pub avis: Avis,
    pub prestataire: RatingSummary,
    pub service: RatingSummary,
}

/// Response after deleting a review.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAvisResponse {
    pub id: Uuid,
    pub prestataire: RatingSummary,
    pub service: RatingSummary,
}

/// Admin moderation decision.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModerateAvisRequest {
    pub approve: bool,
    #[validate(length(max = 500, message = "Le motif ne peut dépasser 500 caractères"))]
    pub reason: Option<String>,
}

/// Admin moderation decision applied to several reviews.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkModerateAvisRequest {
    #[validate(length(min = 1, max = 100, message = "Entre 1 et 100 avis par lot"))]
    pub ids: Vec<Uuid>,
    pub approve: bool,
    #[validate(length(max = 500, message = "Le motif ne peut dépasser 500 caractères"))]
    pub reason: Option<String>,
}

/// Result of a bulk moderation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkModerateAvisResponse {
    pub moderated: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
}

/// Query parameters for listing a provider's reviews.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAvisQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Response for listing reviews.
#[derive(Debug, Clone, Serialize)]
pub struct ListAvisResponse {
    pub data: Vec<Avis>,
    pub pagination: shared::pagination::Pagination,
}
