//! Catalog repository: categories and provider profiles.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{
    CategorieEntity, PrestataireEntity, QuotaSnapshotEntity, RatingEntity, SousCategorieEntity,
};
use crate::metrics::QueryTimer;

/// Repository for catalog and provider database operations.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active categories, by name.
    pub async fn list_active_categories(&self) -> Result<Vec<CategorieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_categories");
        let result = sqlx::query_as::<_, CategorieEntity>(
            r#"
            SELECT id, nom, description
            FROM categories
            WHERE is_active = true
            ORDER BY nom
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active sub-categories of active categories, by name.
    pub async fn list_active_sous_categories(
        &self,
    ) -> Result<Vec<SousCategorieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_sous_categories");
        let result = sqlx::query_as::<_, SousCategorieEntity>(
            r#"
            SELECT sc.id, sc.categorie_id, sc.nom
            FROM sous_categories sc
            JOIN categories c ON c.id = sc.categorie_id
            WHERE sc.is_active = true AND c.is_active = true
            ORDER BY sc.nom
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// True if the sub-category exists and is active.
    pub async fn sous_categorie_is_active(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("sous_categorie_is_active");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sous_categories WHERE id = $1 AND is_active = true
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a provider by ID.
    pub async fn find_prestataire(
        &self,
        id: Uuid,
    ) -> Result<Option<PrestataireEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_prestataire_by_id");
        let result = sqlx::query_as::<_, PrestataireEntity>(
            r#"
            SELECT id, user_id, nom_commercial, adresse, ville, pays, plan_actuel_id,
                   abonnement_expires_at, is_verified, note_moyenne, nombre_avis,
                   created_at, updated_at
            FROM prestataires
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the provider profile owned by a user.
    pub async fn find_prestataire_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PrestataireEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_prestataire_by_user");
        let result = sqlx::query_as::<_, PrestataireEntity>(
            r#"
            SELECT id, user_id, nom_commercial, adresse, ville, pays, plan_actuel_id,
                   abonnement_expires_at, is_verified, note_moyenne, nombre_avis,
                   created_at, updated_at
            FROM prestataires
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Read-only quota snapshot.
    pub async fn quota_snapshot(
        &self,
        prestataire_id: Uuid,
    ) -> Result<Option<QuotaSnapshotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("quota_snapshot");
        let result = sqlx::query_as::<_, QuotaSnapshotEntity>(
            r#"
            SELECT p.id AS prestataire_id, pl.max_services, pl.max_photos_par_service,
                   p.abonnement_expires_at,
                   (SELECT COUNT(*) FROM services s
                    WHERE s.prestataire_id = p.id AND s.deleted_at IS NULL) AS service_count
            FROM prestataires p
            LEFT JOIN plans_abonnement pl ON pl.id = p.plan_actuel_id
            WHERE p.id = $1
            "#,
        )
        .bind(prestataire_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Quota snapshot taken after locking the provider row, so that
    /// concurrent service creations by the same provider are serialized.
    pub async fn lock_quota_snapshot(
        conn: &mut PgConnection,
        prestataire_id: Uuid,
    ) -> Result<Option<QuotaSnapshotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_quota_snapshot");
        let locked = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM prestataires WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(prestataire_id)
        .fetch_optional(&mut *conn)
        .await;

        let result = match locked {
            Ok(Some(_)) => {
                sqlx::query_as::<_, QuotaSnapshotEntity>(
                    r#"
                    SELECT p.id AS prestataire_id, pl.max_services, pl.max_photos_par_service,
                           p.abonnement_expires_at,
                           (SELECT COUNT(*) FROM services s
                            WHERE s.prestataire_id = p.id AND s.deleted_at IS NULL) AS service_count
                    FROM prestataires p
                    LEFT JOIN plans_abonnement pl ON pl.id = p.plan_actuel_id
                    WHERE p.id = $1
                    "#,
                )
                .bind(prestataire_id)
                .fetch_optional(&mut *conn)
                .await
            }
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        timer.record();
        result
    }

    /// Applies a validated subscription. Returns the number of rows touched.
    pub async fn apply_subscription(
        conn: &mut PgConnection,
        prestataire_id: Uuid,
        plan_id: Uuid,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("apply_subscription");
        let result = sqlx::query(
            r#"
            UPDATE prestataires
            SET plan_actuel_id = $2, abonnement_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(prestataire_id)
        .bind(plan_id)
        .bind(expires_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Recomputes the provider's rating cache from its reviews.
    pub async fn refresh_rating(
        conn: &mut PgConnection,
        prestataire_id: Uuid,
    ) -> Result<RatingEntity, sqlx::Error> {
        let timer = QueryTimer::new("refresh_prestataire_rating");
        let result = sqlx::query_as::<_, RatingEntity>(
            r#"
            UPDATE prestataires p
            SET note_moyenne = agg.note_moyenne, nombre_avis = agg.nombre_avis, updated_at = NOW()
            FROM (
                SELECT COALESCE(AVG(note), 0)::float8 AS note_moyenne,
                       COUNT(*)::int4 AS nombre_avis
                FROM avis
                WHERE prestataire_id = $1
            ) agg
            WHERE p.id = $1
            RETURNING p.note_moyenne, p.nombre_avis
            "#,
        )
        .bind(prestataire_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }
}
