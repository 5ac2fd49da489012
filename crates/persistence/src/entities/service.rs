//! Service entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Service;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the services table.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceEntity {
    pub id: Uuid,
    pub prestataire_id: Uuid,
    pub sous_categorie_id: Uuid,
    pub nom: String,
    pub description: Option<String>,
    pub prix: Decimal,
    pub devise: String,
    pub duree_minutes: i32,
    pub photos: Json<Vec<String>>,
    pub is_active: bool,
    pub note_moyenne: f64,
    pub nombre_avis: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceEntity {
    /// Bookable: active and not deleted.
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

impl From<ServiceEntity> for Service {
    fn from(entity: ServiceEntity) -> Self {
        Self {
            id: entity.id,
            prestataire_id: entity.prestataire_id,
            sous_categorie_id: entity.sous_categorie_id,
            nom: entity.nom,
            description: entity.description,
            prix: entity.prix,
            devise: entity.devise,
            duree_minutes: entity.duree_minutes,
            photos: entity.photos.0,
            is_active: entity.is_active,
            note_moyenne: entity.note_moyenne,
            nombre_avis: entity.nombre_avis,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Recomputed rating cache of a provider or service.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct RatingEntity {
    pub note_moyenne: f64,
    pub nombre_avis: i32,
}

impl From<RatingEntity> for domain::models::RatingSummary {
    fn from(entity: RatingEntity) -> Self {
        Self {
            note_moyenne: entity.note_moyenne,
            nombre_avis: entity.nombre_avis,
        }
    }
}
