//! Property tests for the ledger's core invariants.
//!
//! These drive randomized operation sequences through the same pure rules
//! the persistence layer uses, and assert the properties the ledger
//! guarantees: the stored balance always equals the replay of its history,
//! the balance never goes negative, failed operations change nothing, and
//! reversals invert their originals exactly.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::{replay, verify_chain};
use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{EntryView, TransactionKind};

/// One step of a randomized ledger workload.
#[derive(Debug, Clone)]
enum Op {
    Income(Decimal),
    Expense(Decimal),
    /// Attempt to reverse the n-th (mod len) prior entry.
    Reverse(usize),
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    // 0.01 ..= 100.00, two decimal places, always positive
    (1i64..=10_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        amount_strategy().prop_map(Op::Income),
        amount_strategy().prop_map(Op::Expense),
        (0usize..64).prop_map(Op::Reverse),
    ]
}

fn initial_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A recorded entry in the simulated history.
struct Recorded {
    id: Uuid,
    view: EntryView,
    balance_after: Decimal,
    reversed: bool,
}

/// Runs a workload through the pure service rules, mirroring what the
/// persistence layer does under its per-cashbox lock. Rejected operations
/// record nothing.
fn run_workload(initial: Decimal, ops: &[Op]) -> (Decimal, Vec<Recorded>) {
    let mut balance = initial;
    let mut history: Vec<Recorded> = Vec::new();

    for op in ops {
        match op {
            Op::Income(amount) => {
                if LedgerService::validate_amount(*amount).is_err() {
                    continue;
                }
                balance = LedgerService::income_balance(balance, *amount);
                history.push(Recorded {
                    id: Uuid::new_v4(),
                    view: EntryView {
                        kind: TransactionKind::Income,
                        amount: *amount,
                        reversed_kind: None,
                    },
                    balance_after: balance,
                    reversed: false,
                });
            }
            Op::Expense(amount) => {
                if LedgerService::validate_amount(*amount).is_err() {
                    continue;
                }
                match LedgerService::expense_balance(balance, *amount) {
                    Ok(next) => {
                        balance = next;
                        history.push(Recorded {
                            id: Uuid::new_v4(),
                            view: EntryView {
                                kind: TransactionKind::Expense,
                                amount: *amount,
                                reversed_kind: None,
                            },
                            balance_after: balance,
                            reversed: false,
                        });
                    }
                    Err(LedgerError::InsufficientBalance { .. }) => {}
                    Err(other) => panic!("unexpected expense error: {other}"),
                }
            }
            Op::Reverse(pick) => {
                if history.is_empty() {
                    continue;
                }
                let idx = pick % history.len();
                let (original_id, original_kind, original_amount, already_reversed) = {
                    let target = &history[idx];
                    (
                        target.id,
                        target.view.kind,
                        target.view.amount,
                        target.reversed,
                    )
                };

                if LedgerService::validate_reversal(original_id, original_kind, already_reversed)
                    .is_err()
                {
                    continue;
                }
                match LedgerService::reversal_balance(
                    balance,
                    original_id,
                    original_kind,
                    original_amount,
                ) {
                    Ok(next) => {
                        balance = next;
                        history[idx].reversed = true;
                        history.push(Recorded {
                            id: Uuid::new_v4(),
                            view: EntryView {
                                kind: TransactionKind::Reversal,
                                amount: original_amount,
                                reversed_kind: Some(original_kind),
                            },
                            balance_after: balance,
                            reversed: false,
                        });
                    }
                    Err(LedgerError::InsufficientBalance { .. }) => {}
                    Err(other) => panic!("unexpected reversal error: {other}"),
                }
            }
        }
    }

    (balance, history)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any workload, the running balance equals the replay of the
    /// recorded history from the initial balance.
    #[test]
    fn prop_balance_equals_replay(
        initial in initial_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let (balance, history) = run_workload(initial, &ops);
        let views: Vec<EntryView> = history.iter().map(|r| r.view).collect();

        prop_assert_eq!(replay(initial, &views).unwrap(), balance);
    }

    /// For any workload, the balance never goes below zero.
    #[test]
    fn prop_balance_never_negative(
        initial in initial_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let (balance, history) = run_workload(initial, &ops);

        prop_assert!(balance >= Decimal::ZERO);
        for recorded in &history {
            prop_assert!(recorded.balance_after >= Decimal::ZERO);
        }
    }

    /// For any workload, the balance_after snapshots form a derivable chain.
    #[test]
    fn prop_balance_after_chain_holds(
        initial in initial_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let (_, history) = run_workload(initial, &ops);
        let chain: Vec<(EntryView, Decimal)> =
            history.iter().map(|r| (r.view, r.balance_after)).collect();

        prop_assert!(verify_chain(initial, &chain).unwrap());
    }

    /// A rejected expense leaves the balance exactly where it was.
    #[test]
    fn prop_failed_expense_changes_nothing(
        initial in initial_strategy(),
        extra in amount_strategy(),
    ) {
        let overdraw = initial + extra;
        let result = LedgerService::expense_balance(initial, overdraw);

        match result {
            Err(LedgerError::InsufficientBalance { available, required }) => {
                prop_assert_eq!(available, initial);
                prop_assert_eq!(required, overdraw);
            }
            other => prop_assert!(false, "expected InsufficientBalance, got {:?}", other.is_ok()),
        }
    }

    /// Reversing an entry returns the balance to its value before the
    /// original was recorded.
    #[test]
    fn prop_reversal_inverts_original(
        start in initial_strategy(),
        amount in amount_strategy(),
    ) {
        let id = Uuid::new_v4();

        // Income then reversal.
        let after_income = LedgerService::income_balance(start, amount);
        let back = LedgerService::reversal_balance(after_income, id, TransactionKind::Income, amount)
            .unwrap();
        prop_assert_eq!(back, start);

        // Expense then reversal, when the expense is legal.
        if let Ok(after_expense) = LedgerService::expense_balance(start, amount) {
            let restored = LedgerService::reversal_balance(
                after_expense,
                id,
                TransactionKind::Expense,
                amount,
            )
            .unwrap();
            prop_assert_eq!(restored, start);
        }
    }

    /// The daily summary is internally consistent for any day of entries.
    #[test]
    fn prop_daily_summary_consistent(
        opening in initial_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let (_, history) = run_workload(opening, &ops);
        let views: Vec<EntryView> = history.iter().map(|r| r.view).collect();

        let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let summary = LedgerService::summarize_day(date, opening, &views).unwrap();

        prop_assert_eq!(summary.net, summary.income - summary.expense);
        prop_assert_eq!(summary.closing, summary.opening + summary.net);
        prop_assert_eq!(summary.closing, replay(opening, &views).unwrap());
        prop_assert_eq!(summary.txn_count, views.len() as u64);
        prop_assert_eq!(
            summary.reversal_count,
            views.iter().filter(|v| v.kind.is_reversal()).count() as u64
        );
    }
}
