//! Resolving the caller's provider profile.

use domain::models::Role;
use persistence::entities::PrestataireEntity;
use persistence::repositories::CatalogRepository;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Provider profile of a `prestataire` caller.
pub async fn current_prestataire(
    catalog: &CatalogRepository,
    auth: &AuthUser,
) -> Result<PrestataireEntity, ApiError> {
    auth.require_role(Role::Prestataire)?;
    catalog
        .find_prestataire_by_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profil prestataire introuvable".into()))
}

/// User account behind a provider, for notifications. Lookup failures are
/// logged and yield `None`.
pub async fn prestataire_user_id(
    catalog: &CatalogRepository,
    prestataire_id: Uuid,
) -> Option<Uuid> {
    match catalog.find_prestataire(prestataire_id).await {
        Ok(found) => found.map(|p| p.user_id),
        Err(e) => {
            tracing::warn!(prestataire_id = %prestataire_id, error = %e, "Provider lookup failed");
            None
        }
    }
}
