//! Wave transaction entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{WaveStatus, WaveTransaction};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for Wave transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "wave_status", rename_all = "snake_case")]
pub enum WaveStatusDb {
    EnAttente,
    Valide,
    Rejete,
}

impl From<WaveStatusDb> for WaveStatus {
    fn from(db: WaveStatusDb) -> Self {
        match db {
            WaveStatusDb::EnAttente => WaveStatus::EnAttente,
            WaveStatusDb::Valide => WaveStatus::Valide,
            WaveStatusDb::Rejete => WaveStatus::Rejete,
        }
    }
}

impl From<WaveStatus> for WaveStatusDb {
    fn from(status: WaveStatus) -> Self {
        match status {
            WaveStatus::EnAttente => WaveStatusDb::EnAttente,
            WaveStatus::Valide => WaveStatusDb::Valide,
            WaveStatus::Rejete => WaveStatusDb::Rejete,
        }
    }
}

/// Database row mapping for the transactions_wave table.
#[derive(Debug, Clone, FromRow)]
pub struct WaveTransactionEntity {
    pub id: Uuid,
    pub prestataire_id: Uuid,
    pub plan_id: Uuid,
    pub wave_transaction_id: String,
    pub montant: Decimal,
    pub devise: String,
    pub duree_abonnement_jours: i32,
    pub statut: WaveStatusDb,
    pub validated_by: Option<Uuid>,
    pub motif_rejet: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WaveTransactionEntity> for WaveTransaction {
    fn from(entity: WaveTransactionEntity) -> Self {
        Self {
            id: entity.id,
            prestataire_id: entity.prestataire_id,
            plan_id: entity.plan_id,
            wave_transaction_id: entity.wave_transaction_id,
            montant: entity.montant,
            devise: entity.devise,
            duree_abonnement_jours: entity.duree_abonnement_jours,
            statut: entity.statut.into(),
            validated_by: entity.validated_by,
            motif_rejet: entity.motif_rejet,
            validated_at: entity.validated_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
