//! Provider service endpoints and the subscription view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::service::{CreateServiceRequest, ServiceDeletion, UpdateServiceRequest};
use domain::models::subscription::SubscriptionResponse;
use domain::models::{QuotaStatus, Service};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::ServiceCatalog;

/// Response for deleting a service.
#[derive(Debug, Serialize)]
pub struct DeleteServiceResponse {
    pub id: Uuid,
    pub deletion: ServiceDeletion,
}

/// GET /api/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = ServiceCatalog::new(state.pool.clone())
        .subscription(&auth)
        .await?;
    Ok(Json(subscription))
}

/// GET /api/services/quota
pub async fn get_quota(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<QuotaStatus>, ApiError> {
    let quota = ServiceCatalog::new(state.pool.clone()).quota(&auth).await?;
    Ok(Json(quota))
}

/// POST /api/services
pub async fn create_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let service = ServiceCatalog::new(state.pool.clone())
        .create(&auth, request)
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/:id
pub async fn update_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, ApiError> {
    let service = ServiceCatalog::new(state.pool.clone())
        .update(&auth, id, request)
        .await?;
    Ok(Json(service))
}

/// DELETE /api/services/:id
pub async fn delete_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteServiceResponse>, ApiError> {
    let deletion = ServiceCatalog::new(state.pool.clone())
        .delete(&auth, id)
        .await?;
    Ok(Json(DeleteServiceResponse { id, deletion }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_serialization() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(DeleteServiceResponse {
            id,
            deletion: ServiceDeletion::HardDeleted,
        })
        .unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["deletion"], "hard_deleted");
    }
}
