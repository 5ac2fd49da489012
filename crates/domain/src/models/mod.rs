//! Domain models for PrestaCI.

pub mod admin_log;
pub mod avis;
pub mod catalog;
pub mod notification;
pub mod plan;
pub mod reservation;
pub mod service;
pub mod subscription;
pub mod user;
pub mod wave_transaction;

pub use admin_log::{AdminAction, NewAdminLog};
pub use avis::{Avis, RatingSummary};
pub use catalog::{Categorie, Prestataire, SousCategorie};
pub use notification::Notification;
pub use plan::Plan;
pub use reservation::{
    Reservation, ReservationAction, ReservationHistoryEntry, ReservationStatus, ReservationView,
};
pub use service::Service;
pub use subscription::{QuotaSnapshot, QuotaStatus};
pub use user::Role;
pub use wave_transaction::{WaveStatus, WaveTransaction};
