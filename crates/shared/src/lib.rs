//! Shared types, errors, and configuration for the Finnit ledger.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes and decimal money helpers
//! - Typed IDs for type-safe entity references
//! - Pagination types for list queries
//! - The caller-facing error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LedgerConfig};
pub use error::{AppError, AppResult};
