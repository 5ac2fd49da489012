//! Domain services for PrestaCI.
//!
//! Pure business rules used by the API workflows. Nothing here touches
//! storage.

pub mod admin_log;
pub mod notification;
pub mod quota;
pub mod review;
pub mod wave;

pub use admin_log::{admin_log_helpers, AdminLogBuilder};
pub use notification::{
    MockNotificationService, NotificationKind, NotificationMessage, NotificationResult,
    NotificationService, NotificationTemplate,
};
