//! Notification hand-off.
//!
//! The engine never delivers notifications. It builds [`Notification`]
//! values and passes them to an injected [`NotificationSink`].

use std::sync::Mutex;

use finnit_shared::types::{BudgetId, GoalId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budget::BudgetAlert;

/// Data handed to the delivery layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A budget cap crossed the alert threshold.
    BudgetAlert {
        /// Recipient.
        owner: UserId,
        /// Budget the alert belongs to.
        budget_id: BudgetId,
        /// The alert itself.
        alert: BudgetAlert,
    },
    /// A goal passed a progress milestone.
    GoalMilestone {
        /// Recipient.
        owner: UserId,
        /// Goal.
        goal_id: GoalId,
        /// Goal display name.
        goal_name: String,
        /// Milestone percentage (25, 50, 75 or 100).
        milestone: u8,
        /// Goal amount after the contribution.
        current_amount: Decimal,
        /// Goal target.
        target_amount: Decimal,
    },
}

/// Receiver of engine notifications.
///
/// Dispatch must not fail the operation that produced the notification, so
/// it returns nothing.
pub trait NotificationSink: Send + Sync {
    /// Hands one notification to the delivery layer.
    fn dispatch(&self, notification: Notification);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn dispatch(&self, _notification: Notification) {}
}

/// Sink that keeps notifications in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    received: Mutex<Vec<Notification>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything received so far.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|mut received| std::mem::take(&mut *received))
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn dispatch(&self, notification: Notification) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}
