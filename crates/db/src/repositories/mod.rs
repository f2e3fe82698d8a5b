//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! The transaction repository is read-and-append only; the [`Ledger`]
//! service is the single writer of cashbox balances.

pub mod cashbox;
pub mod ledger;
pub mod lock;
pub mod transaction;

pub use cashbox::{CashboxFilter, CashboxRepository, CreateCashboxInput};
pub use ledger::{Ledger, ReconcileReport};
pub use lock::LockRegistry;
pub use transaction::{TransactionFilter, TransactionRepository};

use registra_core::ledger::LedgerError;
use sea_orm::DbErr;

use crate::entities::transactions::IMMUTABLE_VIOLATION;

/// Maps a database error to the ledger error taxonomy.
///
/// Append-only violations raised by the entity behavior hooks or the
/// database trigger surface as the typed `Immutable` failure; everything
/// else is an infrastructure error.
pub(crate) fn db_err(err: DbErr) -> LedgerError {
    let message = err.to_string();
    if message.contains(IMMUTABLE_VIOLATION) {
        LedgerError::Immutable
    } else {
        LedgerError::Database(message)
    }
}
