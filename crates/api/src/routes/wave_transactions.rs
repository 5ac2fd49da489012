//! Wave transaction endpoints for providers and admins.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::wave_transaction::{
    ListWaveTransactionsQuery, ListWaveTransactionsResponse, RejectWaveTransactionRequest,
    SubmitWaveTransactionRequest, WaveValidationResponse,
};
use domain::models::WaveTransaction;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::WaveService;

fn service(state: &AppState) -> WaveService {
    WaveService::new(state.pool.clone(), state.notifier.clone())
}

/// POST /api/wave-transactions
pub async fn submit_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SubmitWaveTransactionRequest>,
) -> Result<(StatusCode, Json<WaveTransaction>), ApiError> {
    let transaction = service(&state).submit(&auth, request).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /api/wave-transactions
pub async fn list_own_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListWaveTransactionsQuery>,
) -> Result<Json<ListWaveTransactionsResponse>, ApiError> {
    Ok(Json(service(&state).list_own(&auth, query).await?))
}

/// GET /api/admin/wave-transactions
pub async fn admin_list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListWaveTransactionsQuery>,
) -> Result<Json<ListWaveTransactionsResponse>, ApiError> {
    Ok(Json(service(&state).admin_list(&auth, query).await?))
}

/// POST /api/admin/wave-transactions/:id/validate
pub async fn validate_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WaveValidationResponse>, ApiError> {
    Ok(Json(service(&state).validate(&auth, id).await?))
}

/// POST /api/admin/wave-transactions/:id/reject
///
/// A missing body is treated like a missing reason.
pub async fn reject_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectWaveTransactionRequest>>,
) -> Result<Json<WaveTransaction>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let transaction = service(&state)
        .reject(&auth, id, request.motif_rejet.as_deref())
        .await?;
    Ok(Json(transaction))
}
