//! Ledger domain types.
//!
//! This module defines the core types for recording and reporting cashbox
//! transactions: entry kinds, the closed category and reference-kind enums
//! shared with collaborator subsystems, and service input/output shapes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use registra_shared::types::{ActorId, CashboxId};

/// Kind of ledger transaction.
///
/// Direction is encoded by the kind, never by the sign of `amount`:
/// - Income adds money to the cashbox
/// - Expense removes money from the cashbox
/// - Reversal counteracts exactly one prior income or expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money flowing into the cashbox.
    Income,
    /// Money flowing out of the cashbox.
    Expense,
    /// Counter-entry that undoes a prior income or expense.
    Reversal,
}

impl TransactionKind {
    /// Returns the lowercase wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Reversal => "reversal",
        }
    }

    /// Returns true if this is a reversal entry.
    #[must_use]
    pub const fn is_reversal(self) -> bool {
        matches!(self, Self::Reversal)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business reason for a transaction.
///
/// This is a closed enum shared with collaborator subsystems. The ledger
/// stores and reports the category but never interprets its semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    /// Client payment captured at the register.
    Payment,
    /// Cash held in custody, deposited.
    CustodyDeposit,
    /// Cash held in custody, returned to its owner.
    CustodyReturn,
    /// Custody cash forfeited and moved between boxes.
    CustodyForfeiture,
    /// Approved operational expense.
    Expense,
    /// Collection against a receivable.
    ReceivablePayment,
    /// Payroll payout.
    SalaryExpense,
    /// Counter-entry created by a reversal.
    Reversal,
    /// Opening amount recorded as a ledger entry.
    InitialBalance,
    /// Manual adjustment.
    Adjustment,
}

impl TransactionCategory {
    /// Returns the snake_case wire name of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::CustodyDeposit => "custody_deposit",
            Self::CustodyReturn => "custody_return",
            Self::CustodyForfeiture => "custody_forfeiture",
            Self::Expense => "expense",
            Self::ReceivablePayment => "receivable_payment",
            Self::SalaryExpense => "salary_expense",
            Self::Reversal => "reversal",
            Self::InitialBalance => "initial_balance",
            Self::Adjustment => "adjustment",
        }
    }
}

impl std::fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(Self::Payment),
            "custody_deposit" => Ok(Self::CustodyDeposit),
            "custody_return" => Ok(Self::CustodyReturn),
            "custody_forfeiture" => Ok(Self::CustodyForfeiture),
            "expense" => Ok(Self::Expense),
            "receivable_payment" => Ok(Self::ReceivablePayment),
            "salary_expense" => Ok(Self::SalaryExpense),
            "reversal" => Ok(Self::Reversal),
            "initial_balance" => Ok(Self::InitialBalance),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

/// Kind tag of a collaborator record referenced by a transaction.
///
/// Collaborators pass their own record's kind and id; the ledger stores the
/// pair opaquely and never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A captured payment.
    Payment,
    /// A custody record.
    Custody,
    /// An approved expense claim.
    Expense,
    /// A payroll run.
    Payroll,
    /// A receivable.
    Receivable,
}

impl ReferenceKind {
    /// Returns the snake_case wire name of this reference kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Custody => "custody",
            Self::Expense => "expense",
            Self::Payroll => "payroll",
            Self::Receivable => "receivable",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(Self::Payment),
            "custody" => Ok(Self::Custody),
            "expense" => Ok(Self::Expense),
            "payroll" => Ok(Self::Payroll),
            "receivable" => Ok(Self::Receivable),
            _ => Err(format!("Unknown reference kind: {s}")),
        }
    }
}

/// Opaque pointer from a transaction to the collaborator record that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    /// The collaborator record's kind tag.
    pub kind: ReferenceKind,
    /// The collaborator record's id.
    pub id: Uuid,
}

/// Snapshot of a cashbox needed for write validation.
#[derive(Debug, Clone)]
pub struct CashboxInfo {
    /// The cashbox ID.
    pub id: CashboxId,
    /// Whether the cashbox accepts writes.
    pub is_active: bool,
    /// The stored balance at the time of the snapshot.
    pub current_balance: Decimal,
}

/// Input for recording an income or expense entry.
#[derive(Debug, Clone)]
pub struct EntryInput {
    /// The amount moved (must be positive; direction comes from the operation).
    pub amount: Decimal,
    /// Business reason for the entry.
    pub category: TransactionCategory,
    /// Human-readable description.
    pub description: String,
    /// The user performing the operation.
    pub actor: ActorId,
    /// Optional pointer to the originating collaborator record.
    pub reference: Option<EntryRef>,
    /// Open key/value bag for contextual detail.
    pub metadata: Option<serde_json::Value>,
}

/// Minimal view of a persisted transaction used by replay and reporting.
///
/// For reversal entries, `reversed_kind` carries the kind of the reversed
/// transaction so the entry's sign can be derived without another lookup.
#[derive(Debug, Clone, Copy)]
pub struct EntryView {
    /// The entry's kind.
    pub kind: TransactionKind,
    /// The entry's (always positive) amount.
    pub amount: Decimal,
    /// Kind of the reversed transaction, for reversal entries.
    pub reversed_kind: Option<TransactionKind>,
}

/// Derived per-day activity report for a cashbox.
///
/// All figures are derived from the transaction history, never stored.
/// `income` sums entries that added money that day (incomes plus reversals
/// of expenses) and `expense` sums entries that removed money, so
/// `closing == opening + income - expense` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    /// The day being summarized.
    pub date: NaiveDate,
    /// Balance at the start of the day.
    pub opening: Decimal,
    /// Total money added during the day.
    pub income: Decimal,
    /// Total money removed during the day.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
    /// Balance at the end of the day.
    pub closing: Decimal,
    /// Number of transactions committed during the day.
    pub txn_count: u64,
    /// Number of reversal transactions among them.
    pub reversal_count: u64,
}
