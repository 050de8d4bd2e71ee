//! Debt amortization and multi-debt payoff strategies.

pub mod amortization;
pub mod error;
pub mod service;
pub mod types;


pub use amortization::{
    NEVER_PAYS_OFF_MONTHS, calculate_payoff_schedule, monthly_rate, months_to_payoff,
};
pub use error::DebtError;
pub use service::DebtService;
pub use types::{
    DebtKind, DebtPosition, DebtProjection, DebtSummary, PayoffSchedule, PayoffStrategy,
};
