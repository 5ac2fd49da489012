//! Notification inbox and admin fan-out endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::notification::{
    BroadcastRequest, FanOutResponse, ListNotificationsQuery, ListNotificationsResponse,
    MarkReadResponse, TargetedNotificationRequest, TemplateNotificationRequest,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::NotificationCenter;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<ListNotificationsResponse>, ApiError> {
    let response = NotificationCenter::new(state.pool.clone())
        .list(&auth, query)
        .await?;
    Ok(Json(response))
}

/// POST /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let response = NotificationCenter::new(state.pool.clone())
        .mark_read(&auth, id)
        .await?;
    Ok(Json(response))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let response = NotificationCenter::new(state.pool.clone())
        .mark_all_read(&auth)
        .await?;
    Ok(Json(response))
}

/// POST /api/admin/notifications/broadcast
pub async fn broadcast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<BroadcastRequest>,
) -> Result<(StatusCode, Json<FanOutResponse>), ApiError> {
    let response = NotificationCenter::new(state.pool.clone())
        .broadcast(&auth, request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/admin/notifications/targeted
pub async fn targeted(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<TargetedNotificationRequest>,
) -> Result<(StatusCode, Json<FanOutResponse>), ApiError> {
    let response = NotificationCenter::new(state.pool.clone())
        .targeted(&auth, request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/admin/notifications/template
pub async fn template(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<TemplateNotificationRequest>,
) -> Result<(StatusCode, Json<FanOutResponse>), ApiError> {
    let response = NotificationCenter::new(state.pool.clone())
        .template(&auth, request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}
