//! Repository implementations for database operations.
//!
//! Repositories hold the pool for standalone queries. Operations that must
//! join a caller's transaction are associated functions taking a
//! `&mut PgConnection`.

pub mod admin_log;
pub mod avis;
pub mod catalog;
pub mod notification;
pub mod plan;
pub mod reservation;
pub mod service;
pub mod user;
pub mod wave_transaction;

pub use admin_log::AdminLogRepository;
pub use avis::{AvisRepository, NewAvis};
pub use catalog::CatalogRepository;
pub use notification::NotificationRepository;
pub use plan::PlanRepository;
pub use reservation::ReservationRepository;
pub use service::ServiceRepository;
pub use user::UserRepository;
pub use wave_transaction::WaveTransactionRepository;
