//! Public catalog: categories and provider profiles.

use domain::errors::DomainError;
use domain::models::catalog::group_categories;
use domain::models::{Categorie, Prestataire};
use persistence::repositories::CatalogRepository;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct CatalogService {
    catalog: CatalogRepository,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogRepository::new(pool),
        }
    }

    /// Active categories, each with its active sub-categories.
    pub async fn categories(&self) -> Result<Vec<Categorie>, ApiError> {
        let categories = self.catalog.list_active_categories().await?;
        let sous_categories = self.catalog.list_active_sous_categories().await?;

        Ok(group_categories(
            categories
                .into_iter()
                .map(|c| (c.id, c.nom, c.description))
                .collect(),
            sous_categories.into_iter().map(Into::into).collect(),
        ))
    }

    pub async fn prestataire(&self, id: Uuid) -> Result<Prestataire, ApiError> {
        self.catalog
            .find_prestataire(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("Prestataire introuvable").into())
    }
}
