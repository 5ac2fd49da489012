//! Wave transaction repository for database operations.
//!
//! Decisions are conditional on `statut = 'en_attente'`, so a decided
//! transaction is never touched again.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{WaveStatusDb, WaveTransactionEntity};
use crate::metrics::QueryTimer;

/// Name of the partial unique index allowing one pending transaction per provider.
pub const ONE_PENDING_INDEX: &str = "uq_transactions_wave_one_pending";

/// Repository for Wave transaction database operations.
#[derive(Clone)]
pub struct WaveTransactionRepository {
    pool: PgPool,
}

impl WaveTransactionRepository {
    /// Creates a new WaveTransactionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The provider's pending transaction, if any.
    pub async fn find_pending_for_prestataire(
        &self,
        prestataire_id: Uuid,
    ) -> Result<Option<WaveTransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_wave_transaction");
        let result = sqlx::query_as::<_, WaveTransactionEntity>(
            r#"
            SELECT id, prestataire_id, plan_id, wave_transaction_id, montant, devise,
                   duree_abonnement_jours, statut, validated_by, motif_rejet, validated_at,
                   created_at, updated_at
            FROM transactions_wave
            WHERE prestataire_id = $1 AND statut = 'en_attente'
            "#,
        )
        .bind(prestataire_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a pending transaction.
    ///
    /// A concurrent pending insert for the same provider fails on
    /// [`ONE_PENDING_INDEX`].
    pub async fn create(
        &self,
        prestataire_id: Uuid,
        plan_id: Uuid,
        wave_transaction_id: &str,
        montant: Decimal,
        duree_jours: i32,
    ) -> Result<WaveTransactionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_wave_transaction");
        let result = sqlx::query_as::<_, WaveTransactionEntity>(
            r#"
            INSERT INTO transactions_wave (prestataire_id, plan_id, wave_transaction_id,
                                           montant, duree_abonnement_jours)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, prestataire_id, plan_id, wave_transaction_id, montant, devise,
                      duree_abonnement_jours, statut, validated_by, motif_rejet, validated_at,
                      created_at, updated_at
            "#,
        )
        .bind(prestataire_id)
        .bind(plan_id)
        .bind(wave_transaction_id)
        .bind(montant)
        .bind(duree_jours)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List transactions, newest first, optionally for one provider and status.
    pub async fn list(
        &self,
        prestataire_id: Option<Uuid>,
        statut: Option<WaveStatusDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WaveTransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_wave_transactions");
        let result = sqlx::query_as::<_, WaveTransactionEntity>(
            r#"
            SELECT id, prestataire_id, plan_id, wave_transaction_id, montant, devise,
                   duree_abonnement_jours, statut, validated_by, motif_rejet, validated_at,
                   created_at, updated_at
            FROM transactions_wave
            WHERE ($1::uuid IS NULL OR prestataire_id = $1)
              AND ($2::wave_status IS NULL OR statut = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(prestataire_id)
        .bind(statut)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count transactions matching the list filters.
    pub async fn count(
        &self,
        prestataire_id: Option<Uuid>,
        statut: Option<WaveStatusDb>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_wave_transactions");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM transactions_wave
            WHERE ($1::uuid IS NULL OR prestataire_id = $1)
              AND ($2::wave_status IS NULL OR statut = $2)
            "#,
        )
        .bind(prestataire_id)
        .bind(statut)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark a pending transaction as validated.
    pub async fn mark_validated(
        conn: &mut PgConnection,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<WaveTransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("validate_wave_transaction");
        let result = sqlx::query_as::<_, WaveTransactionEntity>(
            r#"
            UPDATE transactions_wave
            SET statut = 'valide', validated_by = $2, validated_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND statut = 'en_attente'
            RETURNING id, prestataire_id, plan_id, wave_transaction_id, montant, devise,
                      duree_abonnement_jours, statut, validated_by, motif_rejet, validated_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Mark a pending transaction as rejected.
    pub async fn mark_rejected(
        conn: &mut PgConnection,
        id: Uuid,
        admin_id: Uuid,
        motif_rejet: &str,
    ) -> Result<Option<WaveTransactionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reject_wave_transaction");
        let result = sqlx::query_as::<_, WaveTransactionEntity>(
            r#"
            UPDATE transactions_wave
            SET statut = 'rejete', validated_by = $2, motif_rejet = $3,
                validated_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND statut = 'en_attente'
            RETURNING id, prestataire_id, plan_id, wave_transaction_id, montant, devise,
                      duree_abonnement_jours, statut, validated_by, motif_rejet, validated_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(motif_rejet)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }
}
