//! Service (prestation) models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::DomainError;

/// A service offered by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub prestataire_id: Uuid,
    pub sous_categorie_id: Uuid,
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prix: Decimal,
    pub devise: String,
    pub duree_minutes: i32,
    pub photos: Vec<String>,
    pub is_active: bool,
    pub note_moyenne: f64,
    pub nombre_avis: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provider request to create a service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateServiceRequest {
    pub sous_categorie_id: Uuid,
    #[validate(
        length(min = 2, max = 150, message = "Le nom doit contenir 2 à 150 caractères"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub nom: String,
    #[validate(length(max = 2000, message = "Description trop longue"))]
    pub description: Option<String>,
    #[validate(custom(function = "shared::validation::validate_non_negative_price"))]
    pub prix: Decimal,
    #[validate(range(
        min = 5,
        max = 1440,
        message = "La durée doit être comprise entre 5 et 1440 minutes"
    ))]
    pub duree_minutes: i32,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Provider request to update a service. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    pub sous_categorie_id: Option<Uuid>,
    #[validate(
        length(min = 2, max = 150, message = "Le nom doit contenir 2 à 150 caractères"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub nom: Option<String>,
    #[validate(length(max = 2000, message = "Description trop longue"))]
    pub description: Option<String>,
    #[validate(custom(function = "shared::validation::validate_non_negative_price"))]
    pub prix: Option<Decimal>,
    #[validate(range(
        min = 5,
        max = 1440,
        message = "La durée doit être comprise entre 5 et 1440 minutes"
    ))]
    pub duree_minutes: Option<i32>,
    pub photos: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Rejects photo lists longer than the plan allows.
///
/// `None` for the limit means the provider has no plan, which the quota
/// guard reports on its own.
pub fn check_photo_limit(photos: &[String], limit: Option<i32>) -> Result<(), DomainError> {
    match limit {
        Some(max) if max >= 0 && photos.len() > max as usize => Err(DomainError::validation(
            format!("Votre plan autorise au plus {} photo(s) par service", max),
        )),
        _ => Ok(()),
    }
}

/// Outcome of deleting a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceDeletion {
    /// Reservations reference the service: it is hidden, not removed.
    SoftDeleted,
    HardDeleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_limit() {
        let photos = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        assert!(check_photo_limit(&photos, Some(2)).is_ok());
        assert!(check_photo_limit(&photos, Some(1)).is_err());
        assert!(check_photo_limit(&photos, Some(-1)).is_ok());
        assert!(check_photo_limit(&photos, None).is_ok());
    }

    #[test]
    fn test_create_request_validation() {
        let json = r#"{
            "sous_categorie_id": "550e8400-e29b-41d4-a716-446655440000",
            "nom": "Coupe homme",
            "prix": 3000,
            "duree_minutes": 45
        }"#;
        let req: CreateServiceRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.photos.is_empty());
    }

    #[test]
    fn test_create_request_rejects_short_duration() {
        let json = r#"{
            "sous_categorie_id": "550e8400-e29b-41d4-a716-446655440000",
            "nom": "Express",
            "prix": 500,
            "duree_minutes": 1
        }"#;
        let req: CreateServiceRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let json = r#"{
            "sous_categorie_id": "550e8400-e29b-41d4-a716-446655440000",
            "nom": "     ",
            "prix": 3000,
            "duree_minutes": 45
        }"#;
        let req: CreateServiceRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());

        let update = UpdateServiceRequest {
            nom: Some("   ".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_deletion_serde() {
        assert_eq!(
            serde_json::to_string(&ServiceDeletion::SoftDeleted).unwrap(),
            "\"soft_deleted\""
        );
    }
}
