//! Balance mutation rules for ledger transactions.
//!
//! This module implements the pure side of the ledger:
//! - Domain types for transactions and postings
//! - Balance deltas for create, amend, delete and pending toggles
//! - Business rule validation for sources and linked records
//! - Error types for ledger operations
//! - Ledger service combining the above

pub mod balance;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use balance::{BalanceEvent, replay, summarize};
pub use error::LedgerError;
pub use service::{AmendedPosting, Amendment, LedgerService};
pub use types::{
    AmendScope, FlowDirection, LinkedRecords, Posting, TransactionSource, TransactionSummary,
    TransactionType,
};
