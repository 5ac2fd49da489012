//! Subscription plan endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::plan::{CreatePlanRequest, UpdatePlanRequest};
use domain::models::Plan;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::PlanService;

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<Plan>>, ApiError> {
    let plans = PlanService::new(state.pool.clone()).list_active().await?;
    Ok(Json(plans))
}

/// POST /api/admin/plans
pub async fn create_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>), ApiError> {
    let plan = PlanService::new(state.pool.clone()).create(&auth, request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /api/admin/plans/:id
pub async fn update_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePlanRequest>,
) -> Result<Json<Plan>, ApiError> {
    let plan = PlanService::new(state.pool.clone())
        .update(&auth, id, request)
        .await?;
    Ok(Json(plan))
}
