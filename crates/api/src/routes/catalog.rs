//! Public catalog endpoints: categories, provider profiles and their
//! services and reviews.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::avis::{ListAvisQuery, ListAvisResponse};
use domain::models::{Categorie, Prestataire, Service};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{CatalogService, ReviewService, ServiceCatalog};

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Categorie>>, ApiError> {
    let categories = CatalogService::new(state.pool.clone()).categories().await?;
    Ok(Json(categories))
}

/// GET /api/prestataires/:id
pub async fn get_prestataire(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Prestataire>, ApiError> {
    let prestataire = CatalogService::new(state.pool.clone()).prestataire(id).await?;
    Ok(Json(prestataire))
}

/// GET /api/prestataires/:id/services
pub async fn list_prestataire_services(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, ApiError> {
    let services = ServiceCatalog::new(state.pool.clone()).list_public(id).await?;
    Ok(Json(services))
}

/// GET /api/prestataires/:id/avis
pub async fn list_prestataire_avis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListAvisQuery>,
) -> Result<Json<ListAvisResponse>, ApiError> {
    let response = ReviewService::new(state.pool.clone(), state.notifier.clone())
        .list_public(id, query)
        .await?;
    Ok(Json(response))
}
