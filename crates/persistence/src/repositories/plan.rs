//! Subscription plan repository for database operations.

use domain::models::plan::{CreatePlanRequest, UpdatePlanRequest};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::PlanEntity;
use crate::metrics::QueryTimer;

/// Repository for plan-related database operations.
#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    /// Creates a new PlanRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active plans, cheapest first.
    pub async fn list_active(&self) -> Result<Vec<PlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_plans");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            SELECT id, nom, prix, devise, duree_jours, max_services, max_photos_par_service,
                   commission_pourcentage, fonctionnalites, is_active, is_popular,
                   created_at, updated_at
            FROM plans_abonnement
            WHERE is_active = true
            ORDER BY prix ASC, nom ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a plan by ID, active or not.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_plan_by_id");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            SELECT id, nom, prix, devise, duree_jours, max_services, max_photos_par_service,
                   commission_pourcentage, fonctionnalites, is_active, is_popular,
                   created_at, updated_at
            FROM plans_abonnement
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Clears the popular flag on every plan except `keep`.
    pub async fn clear_popular(
        conn: &mut PgConnection,
        keep: Option<Uuid>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("clear_popular_plans");
        let result = sqlx::query(
            r#"
            UPDATE plans_abonnement
            SET is_popular = false, updated_at = NOW()
            WHERE is_popular = true AND ($1::uuid IS NULL OR id <> $1)
            "#,
        )
        .bind(keep)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Insert a plan.
    pub async fn insert(
        conn: &mut PgConnection,
        request: &CreatePlanRequest,
    ) -> Result<PlanEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_plan");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            INSERT INTO plans_abonnement (nom, prix, devise, duree_jours, max_services,
                                          max_photos_par_service, commission_pourcentage,
                                          fonctionnalites, is_active, is_popular)
            VALUES ($1, $2, COALESCE($3, 'XOF'), $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, nom, prix, devise, duree_jours, max_services, max_photos_par_service,
                      commission_pourcentage, fonctionnalites, is_active, is_popular,
                      created_at, updated_at
            "#,
        )
        .bind(&request.nom)
        .bind(request.prix)
        .bind(request.devise.as_deref())
        .bind(request.duree_jours)
        .bind(request.max_services)
        .bind(request.max_photos_par_service)
        .bind(request.commission_pourcentage)
        .bind(Json(&request.fonctionnalites))
        .bind(request.is_active)
        .bind(request.is_popular)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Update the fields present in `request`.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        request: &UpdatePlanRequest,
    ) -> Result<Option<PlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_plan");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            UPDATE plans_abonnement
            SET nom = COALESCE($2, nom),
                prix = COALESCE($3, prix),
                devise = COALESCE($4, devise),
                duree_jours = COALESCE($5, duree_jours),
                max_services = COALESCE($6, max_services),
                max_photos_par_service = COALESCE($7, max_photos_par_service),
                commission_pourcentage = COALESCE($8, commission_pourcentage),
                fonctionnalites = COALESCE($9, fonctionnalites),
                is_active = COALESCE($10, is_active),
                is_popular = COALESCE($11, is_popular),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, nom, prix, devise, duree_jours, max_services, max_photos_par_service,
                      commission_pourcentage, fonctionnalites, is_active, is_popular,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.nom.as_deref())
        .bind(request.prix)
        .bind(request.devise.as_deref())
        .bind(request.duree_jours)
        .bind(request.max_services)
        .bind(request.max_photos_par_service)
        .bind(request.commission_pourcentage)
        .bind(request.fonctionnalites.as_ref().map(Json))
        .bind(request.is_active)
        .bind(request.is_popular)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }
}
