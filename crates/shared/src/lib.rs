//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision and ISO 4217 currency codes
//! - Typed IDs for type-safe entity references
//! - Pagination types for list queries
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ReportSettings, WeekStart};
pub use error::{AppError, AppResult};
