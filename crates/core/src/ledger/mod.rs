//! Cashbox ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Transaction kinds, categories, and collaborator references
//! - Balance calculations and history replay
//! - Business rule validation for income, expense, and reversal entries
//! - Daily summary derivation
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{apply_delta, entry_delta, replay, verify_chain};
pub use error::LedgerError;
pub use service::{LedgerService, ReversalEffect};
pub use types::{
    CashboxInfo, DailySummary, EntryInput, EntryRef, EntryView, ReferenceKind,
    TransactionCategory, TransactionKind,
};
