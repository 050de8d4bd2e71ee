//! Report error types.

use finnit_shared::AppError;
use thiserror::Error;

/// Report-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Year and month do not name a calendar month.
    #[error("Invalid report period {year}-{month}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },

    /// Projection length outside `1..=max`.
    #[error("Projection must cover between 1 and {max} months, got {months}")]
    InvalidHorizon {
        /// Requested number of months.
        months: u32,
        /// Longest supported projection.
        max: u32,
    },

    /// A scenario needs a name to label its projections.
    #[error("Scenario name cannot be empty")]
    BlankScenarioName,

    /// Scenario income and expenses are magnitudes.
    #[error("Scenario income and expenses cannot be negative")]
    NegativeAmount,

    /// A projected date fell outside the calendar.
    #[error("Projection date out of range")]
    DateOutOfRange,
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "REPORT_INVALID_PERIOD",
            Self::InvalidHorizon { .. } => "REPORT_INVALID_HORIZON",
            Self::BlankScenarioName => "REPORT_BLANK_SCENARIO",
            Self::NegativeAmount => "REPORT_NEGATIVE_AMOUNT",
            Self::DateOutOfRange => "REPORT_DATE_OUT_OF_RANGE",
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        Self::Validation(err.to_string())
    }
}
