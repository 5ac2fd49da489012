//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod avis;
pub mod catalog;
pub mod notification;
pub mod plan;
pub mod reservation;
pub mod service;
pub mod user;
pub mod wave_transaction;

pub use avis::AvisEntity;
pub use catalog::{CategorieEntity, PrestataireEntity, QuotaSnapshotEntity, SousCategorieEntity};
pub use notification::{NotificationEntity, OutboxEntity, OutboxStatusDb};
pub use plan::PlanEntity;
pub use reservation::{
    NewReservation, ReservationEntity, ReservationHistoryEntity, ReservationStatusDb,
};
pub use service::{RatingEntity, ServiceEntity};
pub use user::{RoleDb, UserEntity};
pub use wave_transaction::{WaveStatusDb, WaveTransactionEntity};
