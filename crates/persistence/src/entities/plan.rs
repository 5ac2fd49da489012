//! Subscription plan entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Plan;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the plans_abonnement table.
#[derive(Debug, Clone, FromRow)]
pub struct PlanEntity {
    pub id: Uuid,
    pub nom: String,
    pub prix: Decimal,
    pub devise: String,
    pub duree_jours: i32,
    pub max_services: i32,
    pub max_photos_par_service: i32,
    pub commission_pourcentage: Decimal,
    pub fonctionnalites: Json<Vec<String>>,
    pub is_active: bool,
    pub is_popular: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanEntity> for Plan {
    fn from(entity: PlanEntity) -> Self {
        Self {
            id: entity.id,
            nom: entity.nom,
            prix: entity.prix,
            devise: entity.devise,
            duree_jours: entity.duree_jours,
            max_services: entity.max_services,
            max_photos_par_service: entity.max_photos_par_service,
            commission_pourcentage: entity.commission_pourcentage,
            fonctionnalites: entity.fonctionnalites.0,
            is_active: entity.is_active,
            is_popular: entity.is_popular,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
