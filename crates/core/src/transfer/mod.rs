//! Transfers between two accounts of the same owner.

pub mod error;
pub mod plan;

pub use error::TransferError;
pub use plan::{AccountSnapshot, TransferLeg, TransferPlan, TransferPlanner, lock_order};
