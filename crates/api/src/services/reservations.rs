//! Reservation workflow.
//!
//! Booking, the four lifecycle actions and the read side. Status changes go
//! through [`ReservationRepository::transition`], which writes the
//! conditional update and its history row in one transaction.

use chrono::Utc;
use domain::errors::DomainError;
use domain::models::reservation::{
    CreateReservationRequest, ListReservationsQuery, ListReservationsResponse,
};
use domain::models::{
    Reservation, ReservationAction, ReservationHistoryEntry, ReservationStatus, ReservationView,
    Role,
};
use domain::services::NotificationMessage;
use persistence::entities::{NewReservation, ReservationEntity};
use persistence::repositories::{CatalogRepository, ReservationRepository, ServiceRepository};
use shared::pagination::{PageRequest, Pagination};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::record_reservation_transition;
use crate::services::notifications::NotificationDispatcher;
use crate::services::profile::{current_prestataire, prestataire_user_id};

const CREATED_COMMENT: &str = "Réservation créée par le client";

fn not_found() -> ApiError {
    DomainError::not_found("Réservation introuvable").into()
}

#[derive(Clone)]
pub struct ReservationService {
    reservations: ReservationRepository,
    services: ServiceRepository,
    catalog: CatalogRepository,
    notifier: NotificationDispatcher,
}

impl ReservationService {
    pub fn new(pool: PgPool, notifier: NotificationDispatcher) -> Self {
        Self {
            reservations: ReservationRepository::new(pool.clone()),
            services: ServiceRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool),
            notifier,
        }
    }

    /// Books a service for the calling client.
    ///
    /// The end time and final price are derived from the service as it is
    /// now; later price changes never touch existing reservations.
    pub async fn create(
        &self,
        auth: &AuthUser,
        request: CreateReservationRequest,
    ) -> Result<Reservation, ApiError> {
        auth.require_role(Role::Client)?;
        request.validate()?;
        request.check_home_visit()?;

        if request.date_reservation < Utc::now().date_naive() {
            return Err(DomainError::validation(
                "La date de réservation ne peut pas être dans le passé",
            )
            .into());
        }

        let service = self
            .services
            .find_by_id(request.service_id)
            .await?
            .filter(|s| s.is_bookable())
            .ok_or_else(|| ApiError::from(DomainError::not_found("Service introuvable")))?;

        let heure_fin = shared::time::end_of_slot(request.heure_debut, service.duree_minutes)
            .ok_or_else(|| {
                ApiError::from(DomainError::validation(
                    "Le créneau ne peut pas se terminer après minuit",
                ))
            })?;

        let entity = self
            .reservations
            .create(
                &NewReservation {
                    client_id: auth.user_id,
                    prestataire_id: service.prestataire_id,
                    service_id: service.id,
                    date_reservation: request.date_reservation,
                    heure_debut: request.heure_debut,
                    heure_fin,
                    prix_final: service.prix,
                    notes_client: request.notes_client.clone(),
                    a_domicile: request.a_domicile,
                    adresse_intervention: request.adresse_intervention.clone(),
                },
                CREATED_COMMENT,
            )
            .await?;

        let reservation: Reservation = entity.into();
        record_reservation_transition(ReservationStatus::EnAttente.code());
        info!(
            reservation_id = %reservation.id,
            client_id = %reservation.client_id,
            service_id = %reservation.service_id,
            "Reservation created"
        );

        if let Some(user_id) = prestataire_user_id(&self.catalog, reservation.prestataire_id).await
        {
            self.notifier
                .notify(user_id, NotificationMessage::reservation_created(&reservation))
                .await;
        }

        Ok(reservation)
    }

    /// Applies `action` on behalf of the caller.
    pub async fn transition(
        &self,
        auth: &AuthUser,
        id: Uuid,
        action: ReservationAction,
        motif: Option<&str>,
    ) -> Result<Reservation, ApiError> {
        auth.require_role(action.actor_role())?;

        let current = self.reservations.find_by_id(id).await?.ok_or_else(not_found)?;
        self.check_actor_owns(auth, &current, action).await?;

        let from: ReservationStatus = current.statut_id.into();
        let to = from.apply(action)?;
        let comment = action.comment_with_reason(motif);

        let updated = self
            .reservations
            .transition(id, from.into(), to.into(), &comment, auth.user_id)
            .await?;

        let Some(entity) = updated else {
            // Lost a race: report the status the reservation actually has.
            let latest = self.reservations.find_by_id(id).await?.ok_or_else(not_found)?;
            return Err(DomainError::InvalidTransition {
                from: latest.statut_id.into(),
                action,
            }
            .into());
        };

        let reservation: Reservation = entity.into();
        record_reservation_transition(to.code());
        info!(
            reservation_id = %id,
            from = %from,
            to = %to,
            actor = %auth.user_id,
            "Reservation transitioned"
        );

        let message = NotificationMessage::reservation_transition(&reservation, action, motif);
        let recipient = match action {
            ReservationAction::Cancel => {
                prestataire_user_id(&self.catalog, reservation.prestataire_id).await
            }
            _ => Some(reservation.client_id),
        };
        if let Some(recipient) = recipient {
            self.notifier.notify(recipient, message).await;
        }

        Ok(reservation)
    }

    pub async fn get(&self, auth: &AuthUser, id: Uuid) -> Result<Reservation, ApiError> {
        let entity = self.reservations.find_by_id(id).await?.ok_or_else(not_found)?;
        self.check_can_read(auth, &entity).await?;
        Ok(entity.into())
    }

    /// History rows, oldest first.
    pub async fn history(
        &self,
        auth: &AuthUser,
        id: Uuid,
    ) -> Result<Vec<ReservationHistoryEntry>, ApiError> {
        let entity = self.reservations.find_by_id(id).await?.ok_or_else(not_found)?;
        self.check_can_read(auth, &entity).await?;

        let rows = self.reservations.history(id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Reservations of the calling client or provider, newest first.
    pub async fn list(
        &self,
        auth: &AuthUser,
        query: ListReservationsQuery,
    ) -> Result<ListReservationsResponse, ApiError> {
        let view = match auth.role {
            Role::Client => ReservationView::Client(auth.user_id),
            Role::Prestataire => {
                ReservationView::Prestataire(current_prestataire(&self.catalog, auth).await?.id)
            }
            Role::Admin => {
                return Err(ApiError::Forbidden(
                    "Liste réservée aux clients et prestataires".into(),
                ))
            }
        };

        let page = PageRequest::new(query.page, query.per_page);
        let statut = query.statut.map(Into::into);
        let rows = self
            .reservations
            .list(view, statut, page.limit(), page.offset())
            .await?;
        let total = self.reservations.count(view, statut).await?;

        Ok(ListReservationsResponse {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: Pagination::new(page, total),
        })
    }

    async fn check_actor_owns(
        &self,
        auth: &AuthUser,
        reservation: &ReservationEntity,
        action: ReservationAction,
    ) -> Result<(), ApiError> {
        let owns = match action.actor_role() {
            Role::Prestataire => {
                current_prestataire(&self.catalog, auth).await?.id == reservation.prestataire_id
            }
            _ => reservation.client_id == auth.user_id,
        };
        if owns {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    async fn check_can_read(
        &self,
        auth: &AuthUser,
        reservation: &ReservationEntity,
    ) -> Result<(), ApiError> {
        let allowed = match auth.role {
            Role::Admin => true,
            Role::Client => reservation.client_id == auth.user_id,
            Role::Prestataire => {
                current_prestataire(&self.catalog, auth).await?.id == reservation.prestataire_id
            }
        };
        if allowed {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}
