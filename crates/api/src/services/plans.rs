//! Subscription plan management.

use domain::errors::DomainError;
use domain::models::plan::{CreatePlanRequest, UpdatePlanRequest};
use domain::models::{AdminAction, Plan, Role};
use domain::services::AdminLogBuilder;
use persistence::repositories::{AdminLogRepository, PlanRepository};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AuthUser;

#[derive(Clone)]
pub struct PlanService {
    pool: PgPool,
    plans: PlanRepository,
}

impl PlanService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            plans: PlanRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list_active(&self) -> Result<Vec<Plan>, ApiError> {
        let rows = self.plans.list_active().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Creates a plan. A popular plan takes the flag from any other plan.
    pub async fn create(
        &self,
        auth: &AuthUser,
        request: CreatePlanRequest,
    ) -> Result<Plan, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        if request.is_popular {
            PlanRepository::clear_popular(&mut *tx, None).await?;
        }
        let entity = PlanRepository::insert(&mut *tx, &request).await?;

        let log = AdminLogBuilder::new(auth.user_id, AdminAction::CreatePlan)
            .on_target("plan_abonnement", entity.id)
            .with_detail("nom", entity.nom.clone())
            .with_detail("is_popular", entity.is_popular)
            .build();
        AdminLogRepository::insert(&mut *tx, &log).await?;

        tx.commit().await?;

        info!(plan_id = %entity.id, nom = %entity.nom, admin_id = %auth.user_id, "Plan created");
        Ok(entity.into())
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        id: Uuid,
        request: UpdatePlanRequest,
    ) -> Result<Plan, ApiError> {
        auth.require_role(Role::Admin)?;
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        if request.is_popular == Some(true) {
            PlanRepository::clear_popular(&mut *tx, Some(id)).await?;
        }
        let Some(entity) = PlanRepository::update(&mut *tx, id, &request).await? else {
            tx.rollback().await?;
            return Err(DomainError::not_found("Plan introuvable").into());
        };

        let log = AdminLogBuilder::new(auth.user_id, AdminAction::UpdatePlan)
            .on_target("plan_abonnement", entity.id)
            .with_optional_detail("nom", request.nom.clone())
            .with_optional_detail("is_active", request.is_active)
            .with_optional_detail("is_popular", request.is_popular)
            .build();
        AdminLogRepository::insert(&mut *tx, &log).await?;

        tx.commit().await?;

        info!(plan_id = %id, admin_id = %auth.user_id, "Plan updated");
        Ok(entity.into())
    }
}
