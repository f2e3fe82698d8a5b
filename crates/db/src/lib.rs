//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for cashboxes and their transaction log
//! - Repository abstractions for data access
//! - The [`Ledger`] service: the only writer of cashbox balances
//! - Database migrations
//!
//! Balance mutation is centralized: neither repository exposes a way to set
//! `current_balance`, and the transaction repository has no update or delete
//! operation at all. Every balance change goes through [`Ledger`], which
//! serializes writers per cashbox and commits the transaction insert and the
//! balance update as one atomic unit.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{CashboxRepository, Ledger, LockRegistry, TransactionRepository};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
