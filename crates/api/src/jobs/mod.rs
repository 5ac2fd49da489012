//! Background jobs run by the [`JobScheduler`].

pub mod db_metrics;
pub mod notification_outbox;
pub mod scheduler;

pub use db_metrics::DatabaseMetricsJob;
pub use notification_outbox::NotificationOutboxJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
