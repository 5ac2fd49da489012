//! Catalog entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Prestataire, SousCategorie};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the categories table.
#[derive(Debug, Clone, FromRow)]
pub struct CategorieEntity {
    pub id: Uuid,
    pub nom: String,
    pub description: Option<String>,
}

/// Database row mapping for the sous_categories table.
#[derive(Debug, Clone, FromRow)]
pub struct SousCategorieEntity {
    pub id: Uuid,
    pub categorie_id: Uuid,
    pub nom: String,
}

impl From<SousCategorieEntity> for SousCategorie {
    fn from(entity: SousCategorieEntity) -> Self {
        Self {
            id: entity.id,
            categorie_id: entity.categorie_id,
            nom: entity.nom,
        }
    }
}

/// Database row mapping for the prestataires table.
#[derive(Debug, Clone, FromRow)]
pub struct PrestataireEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nom_commercial: String,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub pays: String,
    pub plan_actuel_id: Option<Uuid>,
    pub abonnement_expires_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub note_moyenne: f64,
    pub nombre_avis: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PrestataireEntity> for Prestataire {
    fn from(entity: PrestataireEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            nom_commercial: entity.nom_commercial,
            adresse: entity.adresse,
            ville: entity.ville,
            pays: entity.pays,
            is_verified: entity.is_verified,
            note_moyenne: entity.note_moyenne,
            nombre_avis: entity.nombre_avis,
            created_at: entity.created_at,
        }
    }
}

/// Provider row joined with its plan limits and service count.
#[derive(Debug, Clone, FromRow)]
pub struct QuotaSnapshotEntity {
    pub prestataire_id: Uuid,
    pub max_services: Option<i32>,
    pub max_photos_par_service: Option<i32>,
    pub abonnement_expires_at: Option<DateTime<Utc>>,
    pub service_count: i64,
}

impl From<QuotaSnapshotEntity> for domain::models::QuotaSnapshot {
    fn from(entity: QuotaSnapshotEntity) -> Self {
        Self {
            prestataire_id: entity.prestataire_id,
            max_services: entity.max_services,
            max_photos_par_service: entity.max_photos_par_service,
            abonnement_expires_at: entity.abonnement_expires_at,
            service_count: entity.service_count,
        }
    }
}
