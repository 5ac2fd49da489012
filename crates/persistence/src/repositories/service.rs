//! Service repository for database operations.

use domain::models::service::{CreateServiceRequest, UpdateServiceRequest};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{RatingEntity, ServiceEntity};
use crate::metrics::QueryTimer;

/// Repository for service-related database operations.
#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    /// Creates a new ServiceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a non-deleted service by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_service_by_id");
        let result = sqlx::query_as::<_, ServiceEntity>(
            r#"
            SELECT id, prestataire_id, sous_categorie_id, nom, description, prix, devise,
                   duree_minutes, photos, is_active, note_moyenne, nombre_avis, deleted_at,
                   created_at, updated_at
            FROM services
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active services of a provider, newest first.
    pub async fn list_active_for_prestataire(
        &self,
        prestataire_id: Uuid,
    ) -> Result<Vec<ServiceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_services_for_prestataire");
        let result = sqlx::query_as::<_, ServiceEntity>(
            r#"
            SELECT id, prestataire_id, sous_categorie_id, nom, description, prix, devise,
                   duree_minutes, photos, is_active, note_moyenne, nombre_avis, deleted_at,
                   created_at, updated_at
            FROM services
            WHERE prestataire_id = $1 AND is_active = true AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(prestataire_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a service for a provider.
    pub async fn insert(
        conn: &mut PgConnection,
        prestataire_id: Uuid,
        request: &CreateServiceRequest,
    ) -> Result<ServiceEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_service");
        let result = sqlx::query_as::<_, ServiceEntity>(
            r#"
            INSERT INTO services (prestataire_id, sous_categorie_id, nom, description, prix,
                                  duree_minutes, photos)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, prestataire_id, sous_categorie_id, nom, description, prix, devise,
                      duree_minutes, photos, is_active, note_moyenne, nombre_avis, deleted_at,
                      created_at, updated_at
            "#,
        )
        .bind(prestataire_id)
        .bind(request.sous_categorie_id)
        .bind(request.nom.trim())
        .bind(request.description.as_deref())
        .bind(request.prix)
        .bind(request.duree_minutes)
        .bind(Json(&request.photos))
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Update the fields present in `request` on a provider's own service.
    pub async fn update(
        &self,
        id: Uuid,
        prestataire_id: Uuid,
        request: &UpdateServiceRequest,
    ) -> Result<Option<ServiceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_service");
        let result = sqlx::query_as::<_, ServiceEntity>(
            r#"
            UPDATE services
            SET sous_categorie_id = COALESCE($3, sous_categorie_id),
                nom = COALESCE($4, nom),
                description = COALESCE($5, description),
                prix = COALESCE($6, prix),
                duree_minutes = COALESCE($7, duree_minutes),
                photos = COALESCE($8, photos),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND prestataire_id = $2 AND deleted_at IS NULL
            RETURNING id, prestataire_id, sous_categorie_id, nom, description, prix, devise,
                      duree_minutes, photos, is_active, note_moyenne, nombre_avis, deleted_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(prestataire_id)
        .bind(request.sous_categorie_id)
        .bind(request.nom.as_deref().map(str::trim))
        .bind(request.description.as_deref())
        .bind(request.prix)
        .bind(request.duree_minutes)
        .bind(request.photos.as_ref().map(Json))
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// True if any reservation references the service.
    pub async fn has_reservations(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("service_has_reservations");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM reservations WHERE service_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Hide a service that reservations still reference.
    pub async fn soft_delete(&self, id: Uuid, prestataire_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("soft_delete_service");
        let result = sqlx::query(
            r#"
            UPDATE services
            SET deleted_at = NOW(), is_active = false, updated_at = NOW()
            WHERE id = $1 AND prestataire_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(prestataire_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Remove a service with no reservation.
    pub async fn hard_delete(&self, id: Uuid, prestataire_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("hard_delete_service");
        let result = sqlx::query(
            r#"
            DELETE FROM services
            WHERE id = $1 AND prestataire_id = $2
            "#,
        )
        .bind(id)
        .bind(prestataire_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Recomputes the service's rating cache from its reviews.
    pub async fn refresh_rating(
        conn: &mut PgConnection,
        service_id: Uuid,
    ) -> Result<RatingEntity, sqlx::Error> {
        let timer = QueryTimer::new("refresh_service_rating");
        let result = sqlx::query_as::<_, RatingEntity>(
            r#"
            UPDATE services s
            SET note_moyenne = agg.note_moyenne, nombre_avis = agg.nombre_avis, updated_at = NOW()
            FROM (
                SELECT COALESCE(AVG(note), 0)::float8 AS note_moyenne,
                       COUNT(*)::int4 AS nombre_avis
                FROM avis
                WHERE service_id = $1
            ) agg
            WHERE s.id = $1
            RETURNING s.note_moyenne, s.nombre_avis
            "#,
        )
        .bind(service_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }
}
