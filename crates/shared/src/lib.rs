//! Shared utilities and common types for the PrestaCI backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT validation
//! - Money rounding for XOF amounts
//! - Time-of-day helpers for reservation slots
//! - Pagination, validation and retry backoff helpers

pub mod backoff;
pub mod jwt;
pub mod money;
pub mod pagination;
pub mod time;
pub mod validation;
