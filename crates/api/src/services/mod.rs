//! Business workflows behind the HTTP handlers.
//!
//! Each service takes the caller as an explicit [`crate::extractors::AuthUser`]
//! and returns [`crate::error::ApiError`].

pub mod catalog;
pub mod notifications;
pub mod plans;
pub mod profile;
pub mod reservations;
pub mod reviews;
pub mod service_catalog;
pub mod wave;

pub use catalog::CatalogService;
pub use notifications::{NotificationCenter, NotificationDispatcher, PgNotificationService};
pub use plans::PlanService;
pub use reservations::ReservationService;
pub use reviews::ReviewService;
pub use service_catalog::ServiceCatalog;
pub use wave::WaveService;
