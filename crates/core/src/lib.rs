//! Core business logic for Finnit.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Balance deltas and transaction mutation rules
//! - `transfer` - Transfer preconditions and leg planning
//! - `debt` - Amortization and avalanche/snowball strategies
//! - `budget` - Budget usage, alerts and pre-transaction checks
//! - `goal` - Goal contributions and progress metrics
//! - `category` - Category tree checks, usage and suggestion helpers
//! - `reports` - Monthly reports, cash-flow projections and what-if scenarios
//! - `notify` - Notification hand-off interface

pub mod budget;
pub mod category;
pub mod debt;
pub mod goal;
pub mod ledger;
pub mod notify;
pub mod reports;
pub mod transfer;
