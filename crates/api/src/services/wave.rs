//! Wave mobile-money subscription payments.
//!
//! Providers submit a claim for a plan; an admin validates it, which applies
//! the subscription, or rejects it with a reason. Every status update is
//! conditional on `en_attente`, so decided claims are never touched again.

use chrono::Utc;
use domain::errors::DomainError;
use domain::models::wave_transaction::{
    ListWaveTransactionsQuery, ListWaveTransactionsResponse, SubmitWaveTransactionRequest,
    WaveValidationResponse,
};
use domain::models::{Plan, Role, WaveTransaction};
use domain::services::{admin_log_helpers, wave, NotificationMessage};
use persistence::db::is_unique_violation;
use persistence::entities::WaveTransactionEntity;
use persistence::repositories::wave_transaction::ONE_PENDING_INDEX;
use persistence::repositories::{
    AdminLogRepository, CatalogRepository, PlanRepository, WaveTransactionRepository,
};
use shared::pagination::{PageRequest, Pagination};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::metrics::record_wave_decision;
use crate::services::notifications::NotificationDispatcher;
use crate::services::profile::{current_prestataire, prestataire_user_id};

fn not_found() -> ApiError {
    DomainError::not_found("Transaction introuvable ou déjà traitée").into()
}

#[derive(Clone)]
pub struct WaveService {
    pool: PgPool,
    transactions: WaveTransactionRepository,
    plans: PlanRepository,
    catalog: CatalogRepository,
    notifier: NotificationDispatcher,
}

impl WaveService {
    pub fn new(pool: PgPool, notifier: NotificationDispatcher) -> Self {
        Self {
            transactions: WaveTransactionRepository::new(pool.clone()),
            plans: PlanRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Records a pending payment claim for the caller.
    pub async fn submit(
        &self,
        auth: &AuthUser,
        request: SubmitWaveTransactionRequest,
    ) -> Result<WaveTransaction, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;
        request.validate()?;

        let plan: Plan = self
            .plans
            .find_by_id(request.plan_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::from(DomainError::not_found("Plan introuvable")))?;

        let montant = wave::check_submission(&plan, &request)?;

        if self
            .transactions
            .find_pending_for_prestataire(prestataire.id)
            .await?
            .is_some()
        {
            return Err(DomainError::DuplicatePendingRequest.into());
        }

        let entity = self
            .transactions
            .create(
                prestataire.id,
                plan.id,
                request.wave_transaction_id.trim(),
                montant,
                request.duree_jours,
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e, Some(ONE_PENDING_INDEX)) {
                    ApiError::from(DomainError::DuplicatePendingRequest)
                } else {
                    ApiError::from(e)
                }
            })?;

        info!(
            transaction_id = %entity.id,
            prestataire_id = %prestataire.id,
            plan_id = %plan.id,
            montant = %montant,
            "Wave transaction submitted"
        );

        Ok(entity.into())
    }

    /// Claims of the calling provider, newest first.
    pub async fn list_own(
        &self,
        auth: &AuthUser,
        query: ListWaveTransactionsQuery,
    ) -> Result<ListWaveTransactionsResponse, ApiError> {
        let prestataire = current_prestataire(&self.catalog, auth).await?;
        self.list(Some(prestataire.id), query).await
    }

    /// All claims, for the admin queue.
    pub async fn admin_list(
        &self,
        auth: &AuthUser,
        query: ListWaveTransactionsQuery,
    ) -> Result<ListWaveTransactionsResponse, ApiError> {
        auth.require_role(Role::Admin)?;
        self.list(None, query).await
    }

    async fn list(
        &self,
        prestataire_id: Option<Uuid>,
        query: ListWaveTransactionsQuery,
    ) -> Result<ListWaveTransactionsResponse, ApiError> {
        let page = PageRequest::new(query.page, query.per_page);
        let statut = query.statut.map(Into::into);

        let rows = self
            .transactions
            .list(prestataire_id, statut, page.limit(), page.offset())
            .await?;
        let total = self.transactions.count(prestataire_id, statut).await?;

        Ok(ListWaveTransactionsResponse {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: Pagination::new(page, total),
        })
    }

    /// Validates a pending claim and applies the subscription.
    ///
    /// Status update, provider update and admin log share one transaction;
    /// if the provider row is missing or the update fails, nothing is kept.
    pub async fn validate(
        &self,
        auth: &AuthUser,
        id: Uuid,
    ) -> Result<WaveValidationResponse, ApiError> {
        auth.require_role(Role::Admin)?;

        let mut tx = self.pool.begin().await?;

        let entity = WaveTransactionRepository::mark_validated(&mut *tx, id, auth.user_id)
            .await?
            .ok_or_else(not_found)?;

        let validated_at = entity.validated_at.unwrap_or_else(Utc::now);
        let expires_at = wave::subscription_expiry(validated_at, entity.duree_abonnement_jours)?;

        let touched = CatalogRepository::apply_subscription(
            &mut *tx,
            entity.prestataire_id,
            entity.plan_id,
            expires_at,
        )
        .await?;
        if touched == 0 {
            tx.rollback().await?;
            warn!(
                transaction_id = %id,
                prestataire_id = %entity.prestataire_id,
                "Provider missing, validation rolled back"
            );
            return Err(DomainError::not_found("Prestataire introuvable").into());
        }

        AdminLogRepository::insert(
            &mut *tx,
            &admin_log_helpers::wave_validated(
                auth.user_id,
                entity.id,
                entity.prestataire_id,
                entity.plan_id,
                entity.duree_abonnement_jours,
            ),
        )
        .await?;

        tx.commit().await?;

        record_wave_decision("valide");
        info!(
            transaction_id = %id,
            prestataire_id = %entity.prestataire_id,
            plan_id = %entity.plan_id,
            expires_at = %expires_at,
            admin_id = %auth.user_id,
            "Wave transaction validated"
        );

        self.notify_validated(&entity, expires_at).await;

        let plan_actuel_id = entity.plan_id;
        Ok(WaveValidationResponse {
            transaction: entity.into(),
            plan_actuel_id,
            abonnement_expires_at: expires_at,
        })
    }

    /// Rejects a pending claim. The reason is checked before any write.
    pub async fn reject(
        &self,
        auth: &AuthUser,
        id: Uuid,
        motif: Option<&str>,
    ) -> Result<WaveTransaction, ApiError> {
        auth.require_role(Role::Admin)?;
        let motif = wave::require_rejection_reason(motif)?;

        let mut tx = self.pool.begin().await?;

        let entity = WaveTransactionRepository::mark_rejected(&mut *tx, id, auth.user_id, &motif)
            .await?
            .ok_or_else(not_found)?;

        AdminLogRepository::insert(
            &mut *tx,
            &admin_log_helpers::wave_rejected(auth.user_id, entity.id, &motif),
        )
        .await?;

        tx.commit().await?;

        record_wave_decision("rejete");
        info!(
            transaction_id = %id,
            prestataire_id = %entity.prestataire_id,
            admin_id = %auth.user_id,
            "Wave transaction rejected"
        );

        if let Some(user_id) = prestataire_user_id(&self.catalog, entity.prestataire_id).await {
            self.notifier
                .notify(user_id, NotificationMessage::payment_rejected(entity.id, &motif))
                .await;
        }

        Ok(entity.into())
    }

    async fn notify_validated(
        &self,
        entity: &WaveTransactionEntity,
        expires_at: chrono::DateTime<Utc>,
    ) {
        let Some(user_id) = prestataire_user_id(&self.catalog, entity.prestataire_id).await else {
            return;
        };
        let plan_nom = match self.plans.find_by_id(entity.plan_id).await {
            Ok(Some(plan)) => plan.nom,
            Ok(None) => String::from("Abonnement"),
            Err(e) => {
                warn!(plan_id = %entity.plan_id, error = %e, "Plan lookup failed");
                String::from("Abonnement")
            }
        };
        self.notifier
            .notify(
                user_id,
                NotificationMessage::subscription_activated(&plan_nom, expires_at),
            )
            .await;
    }
}
