//! HTTP route handlers.

pub mod avis;
pub mod catalog;
pub mod health;
pub mod notifications;
pub mod plans;
pub mod reservations;
pub mod services;
pub mod wave_transactions;
