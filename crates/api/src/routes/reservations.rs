//! Reservation endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::reservation::{
    CreateReservationRequest, ListReservationsQuery, ListReservationsResponse, TransitionRequest,
};
use domain::models::{Reservation, ReservationAction, ReservationHistoryEntry};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::ReservationService;

fn service(state: &AppState) -> ReservationService {
    ReservationService::new(state.pool.clone(), state.notifier.clone())
}

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let reservation = service(&state).create(&auth, request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<ListReservationsResponse>, ApiError> {
    Ok(Json(service(&state).list(&auth, query).await?))
}

/// GET /api/reservations/:id
pub async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    Ok(Json(service(&state).get(&auth, id).await?))
}

/// GET /api/reservations/:id/historique
pub async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReservationHistoryEntry>>, ApiError> {
    Ok(Json(service(&state).history(&auth, id).await?))
}

async fn transition(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    action: ReservationAction,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;
    let reservation = service(state)
        .transition(auth, id, action, request.motif.as_deref())
        .await?;
    Ok(Json(reservation))
}

/// POST /api/reservations/:id/accept
pub async fn accept_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    transition(&state, &auth, id, ReservationAction::Accept, body).await
}

/// POST /api/reservations/:id/reject
pub async fn reject_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    transition(&state, &auth, id, ReservationAction::Reject, body).await
}

/// POST /api/reservations/:id/complete
pub async fn complete_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    transition(&state, &auth, id, ReservationAction::Complete, body).await
}

/// POST /api/reservations/:id/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    transition(&state, &auth, id, ReservationAction::Cancel, body).await
}
