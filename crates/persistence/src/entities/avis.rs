//! Review entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Avis;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the avis table.
#[derive(Debug, Clone, FromRow)]
pub struct AvisEntity {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub client_id: Uuid,
    pub prestataire_id: Uuid,
    pub service_id: Uuid,
    pub note: i32,
    pub commentaire: Option<String>,
    pub photos: Json<Vec<String>>,
    pub is_moderated: bool,
    pub is_approved: Option<bool>,
    pub moderation_reason: Option<String>,
    pub moderated_by: Option<Uuid>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AvisEntity> for Avis {
    fn from(entity: AvisEntity) -> Self {
        Self {
            id: entity.id,
            reservation_id: entity.reservation_id,
            client_id: entity.client_id,
            prestataire_id: entity.prestataire_id,
            service_id: entity.service_id,
            note: entity.note,
            commentaire: entity.commentaire,
            photos: entity.photos.0,
            is_moderated: entity.is_moderated,
            is_approved: entity.is_approved,
            moderation_reason: entity.moderation_reason,
            moderated_by: entity.moderated_by,
            moderated_at: entity.moderated_at,
            created_at: entity.created_at,
        }
    }
}
