//! Property-based tests for budget module.

use chrono::NaiveDate;
use finnit_shared::types::CategoryId;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::BudgetService;
use super::types::{AlertSeverity, BudgetDefinition, BudgetPeriod, CategoryCap, ExpenseLine};

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn single_cap(cap: Decimal) -> (CategoryCap, BudgetDefinition) {
    let cap = CategoryCap {
        category_id: CategoryId::new(),
        name: "Groceries".to_string(),
        cap,
    };
    let definition = BudgetDefinition {
        period: BudgetPeriod::new(2026, 2).unwrap(),
        amount_total: None,
        caps: vec![cap.clone()],
    };
    (cap, definition)
}

proptest! {
    /// Category spend never exceeds the total spend of the window.
    #[test]
    fn prop_category_spend_bounded_by_total(
        amounts in prop::collection::vec((1i64..100_000, 1u32..=28, any::<bool>()), 0..40),
    ) {
        let (cap, definition) = single_cap(dec!(500));
        let lines: Vec<ExpenseLine> = amounts
            .iter()
            .map(|(amount, day, tagged)| ExpenseLine {
                category_id: tagged.then_some(cap.category_id),
                amount: cents(*amount),
                date: NaiveDate::from_ymd_opt(2026, 2, *day).unwrap(),
            })
            .collect();

        let usage = BudgetService::calculate_usage(&definition, &lines);

        prop_assert!(usage.categories[0].spent <= usage.total_spent);
        prop_assert_eq!(
            usage.categories[0].remaining,
            usage.categories[0].budgeted - usage.categories[0].spent
        );
    }

    /// Over budget exactly when spend exceeds the cap.
    #[test]
    fn prop_over_budget_iff_spend_exceeds_cap(cap in 1i64..1_000_000, spent in 0i64..2_000_000) {
        let (category, definition) = single_cap(cents(cap));
        let lines = [ExpenseLine {
            category_id: Some(category.category_id),
            amount: cents(spent),
            date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
        }];

        let usage = BudgetService::calculate_usage(&definition, &lines);
        let exact_over = cents(spent) > cents(cap);
        if usage.categories[0].is_over_budget {
            prop_assert!(exact_over);
        }
    }

    /// Alerts are emitted exactly for caps at or above the threshold.
    #[test]
    fn prop_alerts_respect_threshold(spent in 0i64..30_000, threshold in 1i64..150) {
        let (category, definition) = single_cap(dec!(100));
        let lines = [ExpenseLine {
            category_id: Some(category.category_id),
            amount: cents(spent),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        }];
        let usage = BudgetService::calculate_usage(&definition, &lines);
        let threshold = Decimal::from(threshold);

        let alerts = BudgetService::alerts(&usage, threshold);

        prop_assert_eq!(alerts.len(), usize::from(usage.categories[0].utilization_percentage >= threshold));
        for alert in alerts {
            prop_assert_ne!(alert.severity, AlertSeverity::Critical);
        }
    }

    /// A refused check always means the projection is above the cap.
    #[test]
    fn prop_check_refuses_only_overspend(
        cap in 0i64..100_000,
        current in 0i64..100_000,
        amount in 1i64..100_000,
    ) {
        let (category, _) = single_cap(cents(cap));
        let check = BudgetService::check_before_transaction(
            Some(&category),
            cents(current),
            cents(amount),
            dec!(80),
        );
        prop_assert_eq!(check.allowed, cents(current) + cents(amount) <= cents(cap));
    }
}
