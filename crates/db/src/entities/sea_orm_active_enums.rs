//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use registra_core::ledger::{TransactionCategory as CoreCategory, TransactionKind as CoreKind};

/// Kind of ledger transaction (`transaction_kind` Postgres enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money flowing into the cashbox.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money flowing out of the cashbox.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Counter-entry that undoes a prior income or expense.
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

/// Business reason for a transaction (`transaction_category` Postgres enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_category")]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    /// Client payment captured at the register.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Cash held in custody, deposited.
    #[sea_orm(string_value = "custody_deposit")]
    CustodyDeposit,
    /// Cash held in custody, returned to its owner.
    #[sea_orm(string_value = "custody_return")]
    CustodyReturn,
    /// Custody cash forfeited and moved between boxes.
    #[sea_orm(string_value = "custody_forfeiture")]
    CustodyForfeiture,
    /// Approved operational expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Collection against a receivable.
    #[sea_orm(string_value = "receivable_payment")]
    ReceivablePayment,
    /// Payroll payout.
    #[sea_orm(string_value = "salary_expense")]
    SalaryExpense,
    /// Counter-entry created by a reversal.
    #[sea_orm(string_value = "reversal")]
    Reversal,
    /// Opening amount recorded as a ledger entry.
    #[sea_orm(string_value = "initial_balance")]
    InitialBalance,
    /// Manual adjustment.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

impl From<CoreKind> for TransactionKind {
    fn from(kind: CoreKind) -> Self {
        match kind {
            CoreKind::Income => Self::Income,
            CoreKind::Expense => Self::Expense,
            CoreKind::Reversal => Self::Reversal,
        }
    }
}

impl From<TransactionKind> for CoreKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Reversal => Self::Reversal,
        }
    }
}

impl From<CoreCategory> for TransactionCategory {
    fn from(category: CoreCategory) -> Self {
        match category {
            CoreCategory::Payment => Self::Payment,
            CoreCategory::CustodyDeposit => Self::CustodyDeposit,
            CoreCategory::CustodyReturn => Self::CustodyReturn,
            CoreCategory::CustodyForfeiture => Self::CustodyForfeiture,
            CoreCategory::Expense => Self::Expense,
            CoreCategory::ReceivablePayment => Self::ReceivablePayment,
            CoreCategory::SalaryExpense => Self::SalaryExpense,
            CoreCategory::Reversal => Self::Reversal,
            CoreCategory::InitialBalance => Self::InitialBalance,
            CoreCategory::Adjustment => Self::Adjustment,
        }
    }
}

impl From<TransactionCategory> for CoreCategory {
    fn from(category: TransactionCategory) -> Self {
        match category {
            TransactionCategory::Payment => Self::Payment,
            TransactionCategory::CustodyDeposit => Self::CustodyDeposit,
            TransactionCategory::CustodyReturn => Self::CustodyReturn,
            TransactionCategory::CustodyForfeiture => Self::CustodyForfeiture,
            TransactionCategory::Expense => Self::Expense,
            TransactionCategory::ReceivablePayment => Self::ReceivablePayment,
            TransactionCategory::SalaryExpense => Self::SalaryExpense,
            TransactionCategory::Reversal => Self::Reversal,
            TransactionCategory::InitialBalance => Self::InitialBalance,
            TransactionCategory::Adjustment => Self::Adjustment,
        }
    }
}
