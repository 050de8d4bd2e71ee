//! Category tree rules, usage totals and suggestion helpers.

pub mod defaults;
pub mod error;
pub mod hierarchy;
pub mod suggestion;
pub mod usage;

pub use defaults::DEFAULT_CATEGORIES;
pub use error::CategoryError;
pub use hierarchy::{ensure_valid_parent, would_create_cycle};
pub use suggestion::{SUGGESTION_WINDOW, merchant_key, most_common};
pub use usage::{CategorizedLine, CategorySpend, summarize_usage};
