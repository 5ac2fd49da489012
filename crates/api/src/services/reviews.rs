//! Reviews (avis): creation, deletion, moderation and the public list.
//!
//! Every write recomputes the provider and service rating caches from the
//! `avis` rows inside the same transaction.

use domain::errors::DomainError;
use domain::models::avis::{
    BulkModerateAvisRequest, BulkModerateAvisResponse, CreateAvisRequest, CreateAvisResponse,
    DeleteAvisResponse, ListAvisQuery, ListAvisResponse, ModerateAvisRequest,
};
use domain::models::{AdminAction, Avis, Role};
use domain::services::review::{self, ReviewTarget};
use domain::services::{admin_log_helpers, AdminLogBuilder, NotificationMessage};
use persistence::db::is_unique_violation;
use persistence::entities::{AvisEntity, RatingEntity};
use persistence::repositories::avis::ONE_PER_RESERVATION;
use persistence::repositories::{
    AdminLogRepository, AvisRepository, CatalogRepository, NewAvis, ReservationRepository,
    ServiceRepository,
};
use shared::pagination::{PageRequest, Pagination};
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::notifications::NotificationDispatcher;
use crate::services::profile::prestataire_user_id;

fn not_found() -> ApiError {
    DomainError::not_found("Avis introuvable").into()
}

async fn refresh_ratings(
    conn: &mut PgConnection,
    prestataire_id: Uuid,
    service_id: Uuid,
) -> Result<(RatingEntity, RatingEntity), sqlx::Error> {
    let prestataire = CatalogRepository::refresh_rating(&mut *conn, prestataire_id).await?;
    let service = ServiceRepository::refresh_rating(&mut *conn, service_id).await?;
    Ok((prestataire, service))
}

#[derive(Clone)]
pub struct ReviewService {
    pool: PgPool,
    avis: AvisRepository,
    reservations: ReservationRepository,
    catalog: CatalogRepository,
    notifier: NotificationDispatcher,
}

impl ReviewService {
    pub fn new(pool: PgPool, notifier: NotificationDispatcher) -> Self {
        Self {
            avis: AvisRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Rates a completed reservation of the calling client.
    pub async fn create(
        &self,
        auth: &AuthUser,
        request: CreateAvisRequest,
    ) -> Result<CreateAvisResponse, ApiError> {
        auth.require_role(Role::Client)?;
        request.validate()?;

        let reservation = self
            .reservations
            .find_by_id(request.reservation_id)
            .await?
            .ok_or_else(|| ApiError::from(DomainError::not_found("Réservation introuvable")))?;

        let target = ReviewTarget {
            client_id: reservation.client_id,
            statut: reservation.statut_id.into(),
            already_reviewed: self.avis.exists_for_reservation(reservation.id).await?,
        };
        review::check_eligibility(&target, auth.user_id, request.note)?;

        let mut tx = self.pool.begin().await?;

        let entity = AvisRepository::insert(
            &mut *tx,
            &NewAvis {
                reservation_id: reservation.id,
                client_id: auth.user_id,
                prestataire_id: reservation.prestataire_id,
                service_id: reservation.service_id,
                note: request.note,
                commentaire: request.commentaire.as_deref(),
                photos: &request.photos,
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some(ONE_PER_RESERVATION)) {
                ApiError::from(DomainError::DuplicateReview)
            } else {
                ApiError::from(e)
            }
        })?;

        let (prestataire_rating, service_rating) =
            refresh_ratings(&mut *tx, entity.prestataire_id, entity.service_id).await?;

        tx.commit().await?;

        info!(
            avis_id = %entity.id,
            reservation_id = %entity.reservation_id,
            prestataire_id = %entity.prestataire_id,
            note = entity.note,
            note_moyenne = prestataire_rating.note_moyenne,
            "Review created"
        );

        if let Some(user_id) = prestataire_user_id(&self.catalog, entity.prestataire_id).await {
            self.notifier
                .notify(user_id, NotificationMessage::review_received(entity.id, entity.note))
                .await;
        }

        Ok(CreateAvisResponse {
            avis: entity.into(),
            prestataire: prestataire_rating.into(),
            service: service_rating.into(),
        })
    }

    /// Deletes a review. Its author or an admin may do so.
    pub async fn delete(&self, auth: &AuthUser, id: Uuid) -> Result<DeleteAvisResponse, ApiError> {
        let existing = self.avis.find_by_id(id).await?.ok_or_else(not_found)?;
        match auth.role {
            Role::Admin => {}
            Role::Client if existing.client_id == auth.user_id => {}
            _ => return Err(not_found()),
        }

        let mut tx = self.pool.begin().await?;

        let deleted = AvisRepository::delete(&mut *tx, id)
            .await?
            .ok_or_else(not_found)?;

        let (prestataire_rating, service_rating) =
            refresh_ratings(&mut *tx, deleted.prestataire_id, deleted.service_id).await?;

        if auth.is_admin() {
            let log = AdminLogBuilder::new(auth.user_id, AdminAction::DeleteAvis)
                .on_target("avis", deleted.id)
                .with_detail("prestataire_id", deleted.prestataire_id.to_string())
                .with_detail("note", deleted.note)
                .build();
            AdminLogRepository::insert(&mut *tx, &log).await?;
        }

        tx.commit().await?;

        info!(avis_id = %id, actor = %auth.user_id, "Review deleted");

        Ok(DeleteAvisResponse {
            id,
            prestataire: prestataire_rating.into(),
            service: service_rating.into(),
        })
    }

    /// Records an admin decision on one unmoderated review.
    pub async fn moderate(
        &self,
        auth: &AuthUser,
        id: Uuid,
        request: ModerateAvisRequest,
    ) -> Result<Avis, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let existing = self.avis.find_by_id(id).await?.ok_or_else(not_found)?;
        review::check_moderatable(existing.is_moderated)?;

        let reason = request.reason.as_deref();
        let entity = self
            .moderate_one(auth.user_id, id, request.approve, reason)
            .await?
            // Moderated concurrently since the read above.
            .ok_or_else(|| {
                ApiError::from(DomainError::InvalidState("Cet avis a déjà été modéré".into()))
            })?;

        self.notify_moderation(&entity, request.approve, reason).await;
        Ok(entity.into())
    }

    /// Applies one decision to many reviews, one transaction per review.
    /// Missing or already moderated reviews are reported as skipped.
    pub async fn bulk_moderate(
        &self,
        auth: &AuthUser,
        request: BulkModerateAvisRequest,
    ) -> Result<BulkModerateAvisResponse, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let reason = request.reason.as_deref();
        let mut moderated = Vec::with_capacity(request.ids.len());
        let mut skipped = Vec::new();

        for id in request.ids {
            match self.moderate_one(auth.user_id, id, request.approve, reason).await {
                Ok(Some(entity)) => {
                    self.notify_moderation(&entity, request.approve, reason).await;
                    moderated.push(id);
                }
                Ok(None) => skipped.push(id),
                Err(e) => {
                    warn!(avis_id = %id, error = %e, "Bulk moderation failed for review");
                    skipped.push(id);
                }
            }
        }

        info!(
            admin_id = %auth.user_id,
            moderated = moderated.len(),
            skipped = skipped.len(),
            approve = request.approve,
            "Bulk review moderation"
        );

        Ok(BulkModerateAvisResponse { moderated, skipped })
    }

    async fn moderate_one(
        &self,
        admin_id: Uuid,
        id: Uuid,
        approve: bool,
        reason: Option<&str>,
    ) -> Result<Option<AvisEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(entity) = AvisRepository::moderate(&mut *tx, id, approve, reason, admin_id).await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        AdminLogRepository::insert(
            &mut *tx,
            &admin_log_helpers::avis_moderated(admin_id, id, approve, reason),
        )
        .await?;

        tx.commit().await?;

        info!(avis_id = %id, admin_id = %admin_id, approve, "Review moderated");
        Ok(Some(entity))
    }

    async fn notify_moderation(&self, entity: &AvisEntity, approve: bool, reason: Option<&str>) {
        if approve {
            self.notifier
                .notify(entity.client_id, NotificationMessage::review_approved(entity.id))
                .await;
            if let Some(user_id) = prestataire_user_id(&self.catalog, entity.prestataire_id).await
            {
                self.notifier
                    .notify(user_id, NotificationMessage::review_approved(entity.id))
                    .await;
            }
        } else {
            self.notifier
                .notify(
                    entity.client_id,
                    NotificationMessage::review_rejected(entity.id, reason),
                )
                .await;
        }
    }

    /// Approved and not yet moderated reviews of a provider, newest first.
    pub async fn list_public(
        &self,
        prestataire_id: Uuid,
        query: ListAvisQuery,
    ) -> Result<ListAvisResponse, ApiError> {
        self.catalog
            .find_prestataire(prestataire_id)
            .await?
            .ok_or_else(|| ApiError::from(DomainError::not_found("Prestataire introuvable")))?;

        let page = PageRequest::new(query.page, query.per_page);
        let rows = self
            .avis
            .list_visible_for_prestataire(prestataire_id, page.limit(), page.offset())
            .await?;
        let total = self.avis.count_visible_for_prestataire(prestataire_id).await?;

        Ok(ListAvisResponse {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: Pagination::new(page, total),
        })
    }
}
