//! Ledger service validation and derivation rules.
//!
//! This module provides the pure business logic behind every ledger
//! operation: input validation, the reversal protocol, and derived
//! reporting. It contains no I/O; the persistence layer re-reads state
//! under its per-cashbox lock and calls into these rules before committing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use super::balance::{apply_delta, entry_delta, replay};
use super::error::LedgerError;
use super::types::{CashboxInfo, DailySummary, EntryView, TransactionCategory, TransactionKind};

/// Direction in which a reversal moves money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalEffect {
    /// The original was an expense; reversing it restores money.
    RestoresMoney,
    /// The original was an income; reversing it removes money.
    RemovesMoney,
}

/// Stateless service holding the ledger's business rules.
///
/// All functions are pure: they validate inputs and compute balances from
/// values the caller has already read under the appropriate lock.
pub struct LedgerService;

impl LedgerService {
    /// Validates that an amount is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for zero or negative amounts.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        Ok(())
    }

    /// Validates that a cashbox accepts writes.
    ///
    /// # Errors
    ///
    /// Returns `InactiveCashbox` if the cashbox has been deactivated.
    pub fn validate_active(cashbox: &CashboxInfo) -> Result<(), LedgerError> {
        if !cashbox.is_active {
            return Err(LedgerError::InactiveCashbox(cashbox.id.into_inner()));
        }
        Ok(())
    }

    /// Computes the balance after recording an income.
    #[must_use]
    pub fn income_balance(current: Decimal, amount: Decimal) -> Decimal {
        current + amount
    }

    /// Computes the balance after recording an expense.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if the cashbox does not hold `amount`.
    pub fn expense_balance(current: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
        apply_delta(current, -amount)
    }

    /// Validates that a transaction may be reversed.
    ///
    /// # Errors
    ///
    /// Returns `CannotReverseReversal` if the original is itself a reversal,
    /// or `AlreadyReversed` if a reversal of it already exists.
    pub fn validate_reversal(
        original_id: Uuid,
        original_kind: TransactionKind,
        already_reversed: bool,
    ) -> Result<ReversalEffect, LedgerError> {
        let effect = match original_kind {
            TransactionKind::Reversal => {
                return Err(LedgerError::CannotReverseReversal(original_id));
            }
            TransactionKind::Income => ReversalEffect::RemovesMoney,
            TransactionKind::Expense => ReversalEffect::RestoresMoney,
        };
        if already_reversed {
            return Err(LedgerError::AlreadyReversed(original_id));
        }
        Ok(effect)
    }

    /// Computes the balance after reversing a transaction of the given kind.
    ///
    /// Reversing an income removes money and is subject to the zero floor;
    /// reversing an expense restores money.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` when an income reversal would drive the
    /// balance below zero, or `CannotReverseReversal` for a reversal kind.
    pub fn reversal_balance(
        current: Decimal,
        original_id: Uuid,
        original_kind: TransactionKind,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        match original_kind {
            TransactionKind::Income => apply_delta(current, -amount),
            TransactionKind::Expense => Ok(current + amount),
            TransactionKind::Reversal => Err(LedgerError::CannotReverseReversal(original_id)),
        }
    }

    /// Builds the description for a reversal entry.
    #[must_use]
    pub fn reversal_description(original_id: Uuid, reason: &str) -> String {
        format!("Reversal of transaction {original_id}. Reason: {reason}")
    }

    /// Builds the metadata bag for a reversal entry.
    ///
    /// The bag records the original's id, kind, and category alongside the
    /// caller-supplied reason, so the counter-entry explains itself without
    /// a join.
    #[must_use]
    pub fn reversal_metadata(
        original_id: Uuid,
        original_kind: TransactionKind,
        original_category: TransactionCategory,
        reason: &str,
    ) -> serde_json::Value {
        json!({
            "original_id": original_id,
            "original_kind": original_kind.as_str(),
            "original_category": original_category.as_str(),
            "reason": reason,
        })
    }

    /// Computes a balance as of a point in time from the history up to it.
    ///
    /// # Errors
    ///
    /// Propagates `Internal` on a malformed reversal row.
    pub fn balance_as_of(initial: Decimal, entries: &[EntryView]) -> Result<Decimal, LedgerError> {
        replay(initial, entries)
    }

    /// Derives the daily summary for a cashbox from the day's entries.
    ///
    /// `income` collects positive contributions (incomes and reversals of
    /// expenses), `expense` collects the magnitudes of negative ones, so the
    /// reported closing balance always equals `opening + income - expense`.
    ///
    /// # Errors
    ///
    /// Propagates `Internal` on a malformed reversal row.
    pub fn summarize_day(
        date: NaiveDate,
        opening: Decimal,
        entries: &[EntryView],
    ) -> Result<DailySummary, LedgerError> {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        let mut reversal_count = 0u64;

        for entry in entries {
            let delta = entry_delta(entry)?;
            if delta >= Decimal::ZERO {
                income += delta;
            } else {
                expense -= delta;
            }
            if entry.kind.is_reversal() {
                reversal_count += 1;
            }
        }

        let net = income - expense;
        Ok(DailySummary {
            date,
            opening,
            income,
            expense,
            net,
            closing: opening + net,
            txn_count: entries.len() as u64,
            reversal_count,
        })
    }
}
