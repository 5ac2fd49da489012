//! Reservation entities (database row mappings).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{Reservation, ReservationHistoryEntry, ReservationStatus};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for the `statuts_reservation` lookup ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i16)]
pub enum ReservationStatusDb {
    EnAttente = 1,
    Confirmee = 2,
    Terminee = 3,
    Annulee = 4,
    Refusee = 5,
}

impl From<ReservationStatusDb> for ReservationStatus {
    fn from(db: ReservationStatusDb) -> Self {
        match db {
            ReservationStatusDb::EnAttente => ReservationStatus::EnAttente,
            ReservationStatusDb::Confirmee => ReservationStatus::Confirmee,
            ReservationStatusDb::Terminee => ReservationStatus::Terminee,
            ReservationStatusDb::Annulee => ReservationStatus::Annulee,
            ReservationStatusDb::Refusee => ReservationStatus::Refusee,
        }
    }
}

impl From<ReservationStatus> for ReservationStatusDb {
    fn from(status: ReservationStatus) -> Self {
        match status {
            ReservationStatus::EnAttente => ReservationStatusDb::EnAttente,
            ReservationStatus::Confirmee => ReservationStatusDb::Confirmee,
            ReservationStatus::Terminee => ReservationStatusDb::Terminee,
            ReservationStatus::Annulee => ReservationStatusDb::Annulee,
            ReservationStatus::Refusee => ReservationStatusDb::Refusee,
        }
    }
}

/// Database row mapping for the reservations table.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub prestataire_id: Uuid,
    pub service_id: Uuid,
    pub statut_id: ReservationStatusDb,
    pub date_reservation: NaiveDate,
    pub heure_debut: NaiveTime,
    pub heure_fin: NaiveTime,
    pub prix_final: Decimal,
    pub notes_client: Option<String>,
    pub a_domicile: bool,
    pub adresse_intervention: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReservationEntity> for Reservation {
    fn from(entity: ReservationEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            prestataire_id: entity.prestataire_id,
            service_id: entity.service_id,
            statut: entity.statut_id.into(),
            date_reservation: entity.date_reservation,
            heure_debut: entity.heure_debut,
            heure_fin: entity.heure_fin,
            prix_final: entity.prix_final,
            notes_client: entity.notes_client,
            a_domicile: entity.a_domicile,
            adresse_intervention: entity.adresse_intervention,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the historique_reservations table.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationHistoryEntity {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub ancien_statut_id: Option<ReservationStatusDb>,
    pub nouveau_statut_id: ReservationStatusDb,
    pub commentaire: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationHistoryEntity> for ReservationHistoryEntry {
    fn from(entity: ReservationHistoryEntity) -> Self {
        Self {
            id: entity.id,
            reservation_id: entity.reservation_id,
            ancien_statut: entity.ancien_statut_id.map(Into::into),
            nouveau_statut: entity.nouveau_statut_id.into(),
            commentaire: entity.commentaire,
            user_id: entity.user_id,
            created_at: entity.created_at,
        }
    }
}

/// Values needed to insert a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub client_id: Uuid,
    pub prestataire_id: Uuid,
    pub service_id: Uuid,
    pub date_reservation: NaiveDate,
    pub heure_debut: NaiveTime,
    pub heure_fin: NaiveTime,
    pub prix_final: Decimal,
    pub notes_client: Option<String>,
    pub a_domicile: bool,
    pub adresse_intervention: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ids_match_lookup_table() {
        for (status, id) in [
            (ReservationStatus::EnAttente, 1),
            (ReservationStatus::Confirmee, 2),
            (ReservationStatus::Terminee, 3),
            (ReservationStatus::Annulee, 4),
            (ReservationStatus::Refusee, 5),
        ] {
            let db: ReservationStatusDb = status.into();
            assert_eq!(db as i16, id);
            assert_eq!(ReservationStatus::from(db), status);
        }
    }
}
