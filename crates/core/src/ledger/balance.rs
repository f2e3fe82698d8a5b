//! Cashbox balance calculations.
//!
//! The stored balance of a cashbox is a cache: the authoritative value is
//! always `initial_balance` plus the signed sum of its transaction history.
//! This module holds the pure math for that replay and for the zero floor
//! enforced on every withdrawal.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryView, TransactionKind};

/// Returns the signed balance contribution of a single entry.
///
/// Income adds money, expense removes it, and a reversal carries the inverse
/// sign of the entry it reverses.
///
/// # Errors
///
/// Returns `Internal` for a reversal entry whose reversed kind is missing or
/// is itself a reversal: such a row cannot exist in a well-formed history.
pub fn entry_delta(entry: &EntryView) -> Result<Decimal, LedgerError> {
    match entry.kind {
        TransactionKind::Income => Ok(entry.amount),
        TransactionKind::Expense => Ok(-entry.amount),
        TransactionKind::Reversal => match entry.reversed_kind {
            Some(TransactionKind::Income) => Ok(-entry.amount),
            Some(TransactionKind::Expense) => Ok(entry.amount),
            Some(TransactionKind::Reversal) | None => Err(LedgerError::Internal(
                "reversal entry does not point at an income or expense".to_string(),
            )),
        },
    }
}

/// Applies a signed delta to a balance, enforcing the zero floor.
///
/// # Errors
///
/// Returns `InsufficientBalance` if the delta would drive the balance below
/// zero; the input balance is reported as `available` and the withdrawal
/// amount as `required`.
pub fn apply_delta(current: Decimal, delta: Decimal) -> Result<Decimal, LedgerError> {
    let next = current + delta;
    if next < Decimal::ZERO {
        return Err(LedgerError::InsufficientBalance {
            available: current,
            required: -delta,
        });
    }
    Ok(next)
}

/// Recomputes a balance from first principles.
///
/// Returns `initial + Σ entry_delta(entry)` over the given history. No floor
/// is enforced here: replay reports what the history says, even when the
/// stored balance has drifted.
///
/// # Errors
///
/// Propagates `Internal` from [`entry_delta`] on a malformed reversal row.
pub fn replay(initial: Decimal, entries: &[EntryView]) -> Result<Decimal, LedgerError> {
    let mut balance = initial;
    for entry in entries {
        balance += entry_delta(entry)?;
    }
    Ok(balance)
}

/// Verifies that a sequence of `balance_after` snapshots forms a derivable
/// chain over the entry history: `after[n] == after[n-1] + delta[n]`,
/// starting from `initial`.
///
/// # Errors
///
/// Propagates `Internal` from [`entry_delta`] on a malformed reversal row.
pub fn verify_chain(
    initial: Decimal,
    entries: &[(EntryView, Decimal)],
) -> Result<bool, LedgerError> {
    let mut expected = initial;
    for (entry, balance_after) in entries {
        expected += entry_delta(entry)?;
        if expected != *balance_after {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn income(amount: Decimal) -> EntryView {
        EntryView {
            kind: TransactionKind::Income,
            amount,
            reversed_kind: None,
        }
    }

    fn expense(amount: Decimal) -> EntryView {
        EntryView {
            kind: TransactionKind::Expense,
            amount,
            reversed_kind: None,
        }
    }

    fn reversal_of(kind: TransactionKind, amount: Decimal) -> EntryView {
        EntryView {
            kind: TransactionKind::Reversal,
            amount,
            reversed_kind: Some(kind),
        }
    }

    #[test]
    fn test_entry_delta_signs() {
        assert_eq!(entry_delta(&income(dec!(100))).unwrap(), dec!(100));
        assert_eq!(entry_delta(&expense(dec!(100))).unwrap(), dec!(-100));
        assert_eq!(
            entry_delta(&reversal_of(TransactionKind::Income, dec!(100))).unwrap(),
            dec!(-100)
        );
        assert_eq!(
            entry_delta(&reversal_of(TransactionKind::Expense, dec!(100))).unwrap(),
            dec!(100)
        );
    }

    #[test]
    fn test_entry_delta_rejects_malformed_reversal() {
        let orphan = EntryView {
            kind: TransactionKind::Reversal,
            amount: dec!(10),
            reversed_kind: None,
        };
        assert!(matches!(
            entry_delta(&orphan),
            Err(LedgerError::Internal(_))
        ));

        let nested = reversal_of(TransactionKind::Reversal, dec!(10));
        assert!(matches!(
            entry_delta(&nested),
            Err(LedgerError::Internal(_))
        ));
    }

    #[test]
    fn test_apply_delta_floor() {
        assert_eq!(apply_delta(dec!(100), dec!(-100)).unwrap(), dec!(0));
        let err = apply_delta(dec!(100), dec!(-100.01)).unwrap_err();
        match err {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => {
                assert_eq!(available, dec!(100));
                assert_eq!(required, dec!(100.01));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_replay_mixed_history() {
        let entries = [
            income(dec!(500)),
            expense(dec!(120)),
            reversal_of(TransactionKind::Expense, dec!(120)),
            reversal_of(TransactionKind::Income, dec!(500)),
        ];
        assert_eq!(replay(dec!(1000), &entries).unwrap(), dec!(1000));
    }

    #[test]
    fn test_verify_chain_detects_break() {
        let good = [
            (income(dec!(500)), dec!(1500)),
            (expense(dec!(1500)), dec!(0)),
        ];
        assert!(verify_chain(dec!(1000), &good).unwrap());

        let bad = [
            (income(dec!(500)), dec!(1500)),
            (expense(dec!(1500)), dec!(1)),
        ];
        assert!(!verify_chain(dec!(1000), &bad).unwrap());
    }
}
