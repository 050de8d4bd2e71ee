//! Property-based tests for the balance mutation rules.
//!
//! - Balance invariant: after any sequence of create, amend, delete and
//!   pending toggles, the incrementally maintained balance equals a full
//!   replay of the surviving postings.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BalanceEvent, replay};
use super::service::{Amendment, LedgerService};
use super::types::{FlowDirection, LinkedRecords, Posting, TransactionSource, TransactionType};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Income),
        Just(TransactionType::Expense),
        Just(TransactionType::Adjustment),
    ]
}

fn direction_strategy() -> impl Strategy<Value = FlowDirection> {
    prop_oneof![Just(FlowDirection::Inflow), Just(FlowDirection::Outflow)]
}

#[derive(Debug, Clone)]
enum Op {
    Create {
        kind: TransactionType,
        amount: Decimal,
        direction: FlowDirection,
        is_pending: bool,
    },
    Amend {
        index: usize,
        amount: Decimal,
    },
    Delete {
        index: usize,
    },
    Toggle {
        index: usize,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (kind_strategy(), positive_amount(), direction_strategy(), any::<bool>()).prop_map(
            |(kind, amount, direction, is_pending)| Op::Create {
                kind,
                amount,
                direction,
                is_pending,
            }
        ),
        1 => (any::<usize>(), positive_amount()).prop_map(|(index, amount)| Op::Amend { index, amount }),
        1 => any::<usize>().prop_map(|index| Op::Delete { index }),
        1 => any::<usize>().prop_map(|index| Op::Toggle { index }),
    ]
}

fn usd() -> finnit_shared::types::Currency {
    "USD".parse().unwrap()
}

/// Applies `ops` the way the store does and returns (balance, survivors).
fn run(ops: &[Op]) -> (Decimal, Vec<(TransactionType, Posting)>) {
    let mut balance = Decimal::ZERO;
    let mut rows: Vec<(TransactionType, Posting)> = Vec::new();
    let links = LinkedRecords::default();

    for op in ops {
        match op {
            Op::Create {
                kind,
                amount,
                direction,
                is_pending,
            } => {
                let requested = kind.implied_direction().or(Some(*direction));
                let posting = LedgerService::prepare_create(
                    *kind, *amount, requested, &usd(), &usd(), *is_pending,
                )
                .unwrap();
                balance += BalanceEvent::Created(posting).delta();
                rows.push((*kind, posting));
            }
            Op::Amend { index, amount } if !rows.is_empty() => {
                let slot = index % rows.len();
                let (kind, current) = rows[slot];
                let amended = LedgerService::prepare_amendment(
                    kind,
                    current,
                    TransactionSource::Manual,
                    &links,
                    &Amendment {
                        amount: Some(*amount),
                        ..Amendment::default()
                    },
                )
                .unwrap();
                balance += amended.delta;
                rows[slot] = (amended.kind, amended.posting);
            }
            Op::Delete { index } if !rows.is_empty() => {
                let slot = index % rows.len();
                let (_, posting) = rows.remove(slot);
                balance +=
                    LedgerService::prepare_delete(posting, TransactionSource::Manual, &links)
                        .unwrap();
            }
            Op::Toggle { index } if !rows.is_empty() => {
                let slot = index % rows.len();
                let posting = &mut rows[slot].1;
                let target = !posting.is_pending;
                balance += LedgerService::pending_delta(*posting, target);
                posting.is_pending = target;
            }
            _ => {}
        }
    }

    (balance, rows)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* sequence of mutations, the running balance SHALL equal the
    /// replayed sum of confirmed signed effects.
    #[test]
    fn prop_incremental_balance_matches_replay(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let (balance, rows) = run(&ops);
        let postings: Vec<Posting> = rows.iter().map(|(_, p)| *p).collect();
        prop_assert_eq!(balance, replay(&postings));
    }

    /// *For any* posting, creating then deleting it SHALL leave the balance unchanged.
    #[test]
    fn prop_create_then_delete_is_neutral(
        amount in positive_amount(),
        direction in direction_strategy(),
        is_pending in any::<bool>(),
    ) {
        let posting = Posting::new(amount, direction, is_pending);
        let created = BalanceEvent::Created(posting).delta();
        let deleted = BalanceEvent::Deleted(posting).delta();
        prop_assert_eq!(created + deleted, Decimal::ZERO);
    }

    /// *For any* posting, toggling pending twice SHALL be neutral.
    #[test]
    fn prop_double_toggle_is_neutral(
        amount in positive_amount(),
        direction in direction_strategy(),
        is_pending in any::<bool>(),
    ) {
        let posting = Posting::new(amount, direction, is_pending);
        let first = LedgerService::pending_delta(posting, !is_pending);
        let flipped = Posting { is_pending: !is_pending, ..posting };
        let second = LedgerService::pending_delta(flipped, is_pending);
        prop_assert_eq!(first + second, Decimal::ZERO);
    }

    /// *For any* amendment, the delta SHALL equal the difference of applied effects.
    #[test]
    fn prop_amend_delta_is_effect_difference(
        before in positive_amount(),
        after in positive_amount(),
        is_pending in any::<bool>(),
    ) {
        let current = Posting::new(before, FlowDirection::Outflow, is_pending);
        let amended = LedgerService::prepare_amendment(
            TransactionType::Expense,
            current,
            TransactionSource::Manual,
            &LinkedRecords::default(),
            &Amendment { amount: Some(after), ..Amendment::default() },
        ).unwrap();
        prop_assert_eq!(
            amended.delta,
            amended.posting.applied_effect() - current.applied_effect()
        );
    }
}
