//! Custom Axum extractors.

pub mod auth_user;

pub use auth_user::{bearer_token, AuthUser};
