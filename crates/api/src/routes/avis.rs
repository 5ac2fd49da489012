//! Review (avis) endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::avis::{
    BulkModerateAvisRequest, BulkModerateAvisResponse, CreateAvisRequest, CreateAvisResponse,
    DeleteAvisResponse, ModerateAvisRequest,
};
use domain::models::Avis;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::ReviewService;

fn service(state: &AppState) -> ReviewService {
    ReviewService::new(state.pool.clone(), state.notifier.clone())
}

/// POST /api/avis
pub async fn create_avis(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateAvisRequest>,
) -> Result<(StatusCode, Json<CreateAvisResponse>), ApiError> {
    let response = service(&state).create(&auth, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/avis/:id
pub async fn delete_avis(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteAvisResponse>, ApiError> {
    Ok(Json(service(&state).delete(&auth, id).await?))
}

/// POST /api/admin/avis/:id/moderate
pub async fn moderate_avis(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ModerateAvisRequest>,
) -> Result<Json<Avis>, ApiError> {
    Ok(Json(service(&state).moderate(&auth, id, request).await?))
}

/// POST /api/admin/avis/bulk-moderate
pub async fn bulk_moderate_avis(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<BulkModerateAvisRequest>,
) -> Result<Json<BulkModerateAvisResponse>, ApiError> {
    Ok(Json(service(&state).bulk_moderate(&auth, request).await?))
}
