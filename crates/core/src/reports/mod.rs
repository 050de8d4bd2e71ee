//! Monthly reports, cash-flow projections and what-if scenarios.
//!
//! Everything here is derived from ledger rows handed in by the caller;
//! nothing is stored.

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::{
    CategoryExpense, FlowLine, MonthlyFlow, MonthlyReport, ProjectionPoint, WhatIfInput,
    WhatIfResult, DEFAULT_PROJECTION_MONTHS, HISTORY_MONTHS, MAX_PROJECTION_MONTHS,
};
