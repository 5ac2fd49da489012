//! Domain layer for PrestaCI backend.
//!
//! This crate contains:
//! - Domain models and request/response types
//! - The reservation state machine and the subscription, Wave and review rules
//! - Notification contracts
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
