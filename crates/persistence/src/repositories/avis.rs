//! Review repository for database operations.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::AvisEntity;
use crate::metrics::QueryTimer;

/// Unique constraint allowing one review per reservation.
pub const ONE_PER_RESERVATION: &str = "avis_reservation_id_key";

/// Values needed to insert a review.
#[derive(Debug, Clone)]
pub struct NewAvis<'a> {
    pub reservation_id: Uuid,
    pub client_id: Uuid,
    pub prestataire_id: Uuid,
    pub service_id: Uuid,
    pub note: i32,
    pub commentaire: Option<&'a str>,
    pub photos: &'a [String],
}

/// Repository for review-related database operations.
#[derive(Clone)]
pub struct AvisRepository {
    pool: PgPool,
}

impl AvisRepository {
    /// Creates a new AvisRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a review by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AvisEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_avis_by_id");
        let result = sqlx::query_as::<_, AvisEntity>(
            r#"
            SELECT id, reservation_id, client_id, prestataire_id, service_id, note,
                   commentaire, photos, is_moderated, is_approved, moderation_reason,
                   moderated_by, moderated_at, created_at
            FROM avis
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// True if the reservation already has a review.
    pub async fn exists_for_reservation(&self, reservation_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("avis_exists_for_reservation");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM avis WHERE reservation_id = $1)
            "#,
        )
        .bind(reservation_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a review.
    pub async fn insert(
        conn: &mut PgConnection,
        avis: &NewAvis<'_>,
    ) -> Result<AvisEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_avis");
        let result = sqlx::query_as::<_, AvisEntity>(
            r#"
            INSERT INTO avis (reservation_id, client_id, prestataire_id, service_id, note,
                              commentaire, photos)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, reservation_id, client_id, prestataire_id, service_id, note,
                      commentaire, photos, is_moderated, is_approved, moderation_reason,
                      moderated_by, moderated_at, created_at
            "#,
        )
        .bind(avis.reservation_id)
        .bind(avis.client_id)
        .bind(avis.prestataire_id)
        .bind(avis.service_id)
        .bind(avis.note)
        .bind(avis.commentaire)
        .bind(Json(avis.photos))
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Delete a review. Returns the deleted row.
    pub async fn delete(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<AvisEntity>, sqlx::Error> {
        let timer = QueryTimer::new("delete_avis");
        let result = sqlx::query_as::<_, AvisEntity>(
            r#"
            DELETE FROM avis
            WHERE id = $1
            RETURNING id, reservation_id, client_id, prestataire_id, service_id, note,
                      commentaire, photos, is_moderated, is_approved, moderation_reason,
                      moderated_by, moderated_at, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Record a moderation decision on an unmoderated review.
    pub async fn moderate(
        conn: &mut PgConnection,
        id: Uuid,
        approve: bool,
        reason: Option<&str>,
        admin_id: Uuid,
    ) -> Result<Option<AvisEntity>, sqlx::Error> {
        let timer = QueryTimer::new("moderate_avis");
        let result = sqlx::query_as::<_, AvisEntity>(
            r#"
            UPDATE avis
            SET is_moderated = true, is_approved = $2, moderation_reason = $3,
                moderated_by = $4, moderated_at = NOW()
            WHERE id = $1 AND is_moderated = false
            RETURNING id, reservation_id, client_id, prestataire_id, service_id, note,
                      commentaire, photos, is_moderated, is_approved, moderation_reason,
                      moderated_by, moderated_at, created_at
            "#,
        )
        .bind(id)
        .bind(approve)
        .bind(reason)
        .bind(admin_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Publicly visible reviews of a provider: approved or not yet moderated.
    pub async fn list_visible_for_prestataire(
        &self,
        prestataire_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AvisEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_visible_avis");
        let result = sqlx::query_as::<_, AvisEntity>(
            r#"
            SELECT id, reservation_id, client_id, prestataire_id, service_id, note,
                   commentaire, photos, is_moderated, is_approved, moderation_reason,
                   moderated_by, moderated_at, created_at
            FROM avis
            WHERE prestataire_id = $1 AND (is_moderated = false OR is_approved = true)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(prestataire_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count publicly visible reviews of a provider.
    pub async fn count_visible_for_prestataire(
        &self,
        prestataire_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_visible_avis");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM avis
            WHERE prestataire_id = $1 AND (is_moderated = false OR is_approved = true)
            "#,
        )
        .bind(prestataire_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
