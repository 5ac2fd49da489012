//! Provider services (prestations), subscription view and quota guard.

use chrono::Utc;
use domain::errors::DomainError;
use domain::models::service::{
    check_photo_limit, CreateServiceRequest, ServiceDeletion, UpdateServiceRequest,
};
use domain::models::subscription::SubscriptionResponse;
use domain::models::{QuotaSnapshot, QuotaStatus, Service};
use domain::services::quota;
use persistence::entities::PrestataireEntity;
use persistence::repositories::{
    CatalogRepository, PlanRepository, ServiceRepository, WaveTransactionRepository,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::profile::current_prestataire;

const FOREIGN_KEY_VIOLATION: &str = "23503";

fn service_not_found() -> ApiError {
    DomainError::not_found("Service introuvable").into()
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION))
}

#[derive(Clone)]
pub struct ServiceCatalog {
    pool: PgPool,
    services: ServiceRepository,
    catalog: CatalogRepository,
    plans: PlanRepository,
    transactions: WaveTransactionRepository,
}

impl ServiceCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            services: ServiceRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            plans: PlanRepository::new(pool.clone()),
            transactions: WaveTransactionRepository::new(pool.clone()),
            pool,
        }
    }

    async fn snapshot(&self, prestataire: &PrestataireEntity) -> Result<QuotaSnapshot, ApiError> {
        self.catalog
            .quota_snapshot(prestataire.id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::NotFound("Profil prestataire introuvable".into()))
    }

    /// Read-only evaluation of the quota guard for the caller.
    pub async fn quota(&self, auth: &AuthUser) -> Result<QuotaStatus, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;
        let snapshot = self.snapshot(&prestataire).await?;
        Ok(quota::quota_status(&snapshot, Utc::now()))
    }

    /// Current plan, expiry, usage and pending payment of the caller.
    pub async fn subscription(&self, auth: &AuthUser) -> Result<SubscriptionResponse, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;
        let snapshot = self.snapshot(&prestataire).await?;

        let plan = match prestataire.plan_actuel_id {
            Some(plan_id) => self.plans.find_by_id(plan_id).await?.map(Into::into),
            None => None,
        };
        let pending = self
            .transactions
            .find_pending_for_prestataire(prestataire.id)
            .await?
            .map(Into::into);

        Ok(SubscriptionResponse {
            prestataire_id: prestataire.id,
            plan,
            abonnement_expires_at: prestataire.abonnement_expires_at,
            is_expired: quota::is_expired(prestataire.abonnement_expires_at, Utc::now()),
            services_used: snapshot.service_count,
            services_limit: snapshot.max_services.filter(|max| *max >= 0),
            pending_transaction: pending,
        })
    }

    /// Creates a service once the quota guard passes.
    ///
    /// The guard runs on a snapshot taken after `FOR UPDATE` on the provider
    /// row, inside the insert's transaction, so concurrent creations by one
    /// provider cannot both squeeze under the limit.
    pub async fn create(
        &self,
        auth: &AuthUser,
        request: CreateServiceRequest,
    ) -> Result<Service, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;
        request.validate()?;

        if !self
            .catalog
            .sous_categorie_is_active(request.sous_categorie_id)
            .await?
        {
            return Err(DomainError::not_found("Sous-catégorie introuvable").into());
        }

        let mut tx = self.pool.begin().await?;

        let snapshot: QuotaSnapshot =
            CatalogRepository::lock_quota_snapshot(&mut *tx, prestataire.id)
                .await?
                .map(Into::into)
                .ok_or_else(|| ApiError::NotFound("Profil prestataire introuvable".into()))?;

        quota::check_can_create_service(&snapshot, Utc::now())?;
        check_photo_limit(&request.photos, snapshot.max_photos_par_service)?;

        let entity = ServiceRepository::insert(&mut *tx, prestataire.id, &request).await?;
        tx.commit().await?;

        info!(
            service_id = %entity.id,
            prestataire_id = %prestataire.id,
            services_used = snapshot.service_count + 1,
            "Service created"
        );

        Ok(entity.into())
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<Service, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;
        request.validate()?;

        if let Some(sous_categorie_id) = request.sous_categorie_id {
            if !self.catalog.sous_categorie_is_active(sous_categorie_id).await? {
                return Err(DomainError::not_found("Sous-catégorie introuvable").into());
            }
        }

        if let Some(photos) = &request.photos {
            let snapshot = self.snapshot(&prestataire).await?;
            check_photo_limit(photos, snapshot.max_photos_par_service)?;
        }

        let entity = self
            .services
            .update(id, prestataire.id, &request)
            .await?
            .ok_or_else(service_not_found)?;

        info!(service_id = %id, prestataire_id = %prestataire.id, "Service updated");
        Ok(entity.into())
    }

    /// Soft-deletes a service that reservations reference, hard-deletes
    /// otherwise.
    pub async fn delete(&self, auth: &AuthUser, id: Uuid) -> Result<ServiceDeletion, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;

        let service = self
            .services
            .find_by_id(id)
            .await?
            .filter(|s| s.prestataire_id == prestataire.id)
            .ok_or_else(service_not_found)?;

        let outcome = if self.services.has_reservations(service.id).await? {
            self.soft_delete(service.id, prestataire.id).await?
        } else {
            match self.services.hard_delete(service.id, prestataire.id).await {
                Ok(0) => return Err(service_not_found()),
                Ok(_) => ServiceDeletion::HardDeleted,
                // A reservation arrived in between.
                Err(e) if is_foreign_key_violation(&e) => {
                    self.soft_delete(service.id, prestataire.id).await?
                }
                Err(e) => return Err(e.into()),
            }
        };

        info!(service_id = %id, outcome = ?outcome, "Service deleted");
        Ok(outcome)
    }

    async fn soft_delete(
        &self,
        id: Uuid,
        prestataire_id: Uuid,
    ) -> Result<ServiceDeletion, ApiError> {
        match self.services.soft_delete(id, prestataire_id).await? {
            0 => Err(service_not_found()),
            _ => Ok(ServiceDeletion::SoftDeleted),
        }
    }

    /// Public list of a provider's active services.
    pub async fn list_public(&self, prestataire_id: Uuid) -> Result<Vec<Service>, ApiError> {
        self.catalog
            .find_prestataire(prestataire_id)
            .await?
            .ok_or_else(|| ApiError::from(DomainError::not_found("Prestataire introuvable")))?;

        let rows = self.services.list_active_for_prestataire(prestataire_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
