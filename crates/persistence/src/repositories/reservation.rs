//! Reservation repository for database operations.
//!
//! Every status change and its history row are written in one transaction.

use domain::models::ReservationView;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    NewReservation, ReservationEntity, ReservationHistoryEntity, ReservationStatusDb,
};
use crate::metrics::QueryTimer;

/// Repository for reservation-related database operations.
#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

fn view_filter(view: ReservationView) -> (Option<Uuid>, Option<Uuid>) {
    match view {
        ReservationView::Client(id) => (Some(id), None),
        ReservationView::Prestataire(id) => (None, Some(id)),
    }
}

impl ReservationRepository {
    /// Creates a new ReservationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending reservation and its first history row.
    pub async fn create(
        &self,
        input: &NewReservation,
        commentaire: &str,
    ) -> Result<ReservationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_reservation");
        let mut tx = self.pool.begin().await?;

        let reservation = sqlx::query_as::<_, ReservationEntity>(
            r#"
            INSERT INTO reservations (client_id, prestataire_id, service_id, statut_id,
                                      date_reservation, heure_debut, heure_fin, prix_final,
                                      notes_client, a_domicile, adresse_intervention)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, client_id, prestataire_id, service_id, statut_id, date_reservation,
                      heure_debut, heure_fin, prix_final, notes_client, a_domicile,
                      adresse_intervention, created_at, updated_at
            "#,
        )
        .bind(input.client_id)
        .bind(input.prestataire_id)
        .bind(input.service_id)
        .bind(ReservationStatusDb::EnAttente)
        .bind(input.date_reservation)
        .bind(input.heure_debut)
        .bind(input.heure_fin)
        .bind(input.prix_final)
        .bind(input.notes_client.as_deref())
        .bind(input.a_domicile)
        .bind(input.adresse_intervention.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO historique_reservations (reservation_id, ancien_statut_id,
                                                 nouveau_statut_id, commentaire, user_id)
            VALUES ($1, NULL, $2, $3, $4)
            "#,
        )
        .bind(reservation.id)
        .bind(ReservationStatusDb::EnAttente)
        .bind(commentaire)
        .bind(input.client_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(reservation)
    }

    /// Find a reservation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reservation_by_id");
        let result = sqlx::query_as::<_, ReservationEntity>(
            r#"
            SELECT id, client_id, prestataire_id, service_id, statut_id, date_reservation,
                   heure_debut, heure_fin, prix_final, notes_client, a_domicile,
                   adresse_intervention, created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Move a reservation from `from` to `to` and append the history row.
    ///
    /// Returns `None` when the reservation is no longer in `from`; nothing
    /// is written in that case.
    pub async fn transition(
        &self,
        id: Uuid,
        from: ReservationStatusDb,
        to: ReservationStatusDb,
        commentaire: &str,
        actor_id: Uuid,
    ) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("transition_reservation");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, ReservationEntity>(
            r#"
            UPDATE reservations
            SET statut_id = $3, updated_at = NOW()
            WHERE id = $1 AND statut_id = $2
            RETURNING id, client_id, prestataire_id, service_id, statut_id, date_reservation,
                      heure_debut, heure_fin, prix_final, notes_client, a_domicile,
                      adresse_intervention, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(reservation) = updated else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO historique_reservations (reservation_id, ancien_statut_id,
                                                 nouveau_statut_id, commentaire, user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(commentaire)
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(reservation))
    }

    /// History of a reservation, oldest first.
    pub async fn history(
        &self,
        reservation_id: Uuid,
    ) -> Result<Vec<ReservationHistoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reservation_history");
        let result = sqlx::query_as::<_, ReservationHistoryEntity>(
            r#"
            SELECT id, reservation_id, ancien_statut_id, nouveau_statut_id, commentaire,
                   user_id, created_at
            FROM historique_reservations
            WHERE reservation_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List reservations seen from one side, newest first.
    pub async fn list(
        &self,
        view: ReservationView,
        statut: Option<ReservationStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_reservations");
        let (client_id, prestataire_id) = view_filter(view);
        let result = sqlx::query_as::<_, ReservationEntity>(
            r#"
            SELECT id, client_id, prestataire_id, service_id, statut_id, date_reservation,
                   heure_debut, heure_fin, prix_final, notes_client, a_domicile,
                   adresse_intervention, created_at, updated_at
            FROM reservations
            WHERE ($1::uuid IS NULL OR client_id = $1)
              AND ($2::uuid IS NULL OR prestataire_id = $2)
              AND ($3::smallint IS NULL OR statut_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(client_id)
        .bind(prestataire_id)
        .bind(statut)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count reservations matching the list filters.
    pub async fn count(
        &self,
        view: ReservationView,
        statut: Option<ReservationStatusDb>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_reservations");
        let (client_id, prestataire_id) = view_filter(view);
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM reservations
            WHERE ($1::uuid IS NULL OR client_id = $1)
              AND ($2::uuid IS NULL OR prestataire_id = $2)
              AND ($3::smallint IS NULL OR statut_id = $3)
            "#,
        )
        .bind(client_id)
        .bind(prestataire_id)
        .bind(statut)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
