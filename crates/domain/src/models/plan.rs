//! Subscription plan models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Sentinel for `max_services` meaning "no limit". Any negative value works.
pub const UNLIMITED_SERVICES: i32 = -1;

/// Subscription plan (plan d'abonnement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub nom: String,
    pub prix: Decimal,
    pub devise: String,
    pub duree_jours: i32,
    pub max_services: i32,
    pub max_photos_par_service: i32,
    pub commission_pourcentage: Decimal,
    pub fonctionnalites: Vec<String>,
    pub is_active: bool,
    pub is_popular: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `max_services` as an enforceable limit, `None` when unlimited.
pub fn service_limit(max_services: i32) -> Option<i32> {
    (max_services >= 0).then_some(max_services)
}

/// Admin request to create a plan.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 2, max = 100, message = "Le nom doit contenir 2 à 100 caractères"))]
    pub nom: String,
    #[validate(custom(function = "shared::validation::validate_non_negative_price"))]
    pub prix: Decimal,
    pub devise: Option<String>,
    #[validate(range(
        min = 1,
        max = 3650,
        message = "La durée doit être comprise entre 1 et 3650 jours"
    ))]
    pub duree_jours: i32,
    pub max_services: i32,
    #[validate(range(min = 0, max = 50, message = "Nombre de photos invalide"))]
    pub max_photos_par_service: i32,
    #[serde(default)]
    pub commission_pourcentage: Decimal,
    #[serde(default)]
    pub fonctionnalites: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_popular: bool,
}

/// Admin request to update a plan. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    #[validate(length(min = 2, max = 100, message = "Le nom doit contenir 2 à 100 caractères"))]
    pub nom: Option<String>,
    #[validate(custom(function = "shared::validation::validate_non_negative_price"))]
    pub prix: Option<Decimal>,
    pub devise: Option<String>,
    #[validate(range(
        min = 1,
        max = 3650,
        message = "La durée doit être comprise entre 1 et 3650 jours"
    ))]
    pub duree_jours: Option<i32>,
    pub max_services: Option<i32>,
    #[validate(range(min = 0, max = 50, message = "Nombre de photos invalide"))]
    pub max_photos_par_service: Option<i32>,
    pub commission_pourcentage: Option<Decimal>,
    pub fonctionnalites: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_popular: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_plan_defaults() {
        let json = r#"{
            "nom": "Premium",
            "prix": 5000,
            "duree_jours": 30,
            "max_services": -1,
            "max_photos_par_service": 10
        }"#;
        let req: CreatePlanRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_active);
        assert!(!req.is_popular);
        assert!(req.fonctionnalites.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_plan_rejects_negative_price() {
        let json = r#"{
            "nom": "Cassé",
            "prix": -10,
            "duree_jours": 30,
            "max_services": 3,
            "max_photos_par_service": 5
        }"#;
        let req: CreatePlanRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_plan_empty_is_valid() {
        let req: UpdatePlanRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.is_popular.is_none());
    }

    #[test]
    fn test_service_limit() {
        assert_eq!(service_limit(UNLIMITED_SERVICES), None);
        assert_eq!(service_limit(-5), None);
        assert_eq!(service_limit(0), Some(0));
        assert_eq!(service_limit(3), Some(3));
    }
}
