//! Transaction repository: read and append only.
//!
//! There is deliberately no update or delete operation here. The insert is
//! crate-private so only the [`super::Ledger`] service can create rows, and
//! it always does so inside the atomic unit that updates the owning
//! cashbox's balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use registra_core::ledger::{EntryRef, LedgerError};
use registra_shared::types::{PageRequest, PageResponse};

use super::db_err;
use crate::entities::{
    sea_orm_active_enums::{TransactionCategory, TransactionKind},
    transactions,
};

/// Row data for a new ledger transaction.
#[derive(Debug, Clone)]
pub(crate) struct NewTransaction {
    pub cashbox_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub category: TransactionCategory,
    pub description: String,
    pub reference: Option<EntryRef>,
    pub reversed_transaction_id: Option<Uuid>,
    pub created_by: Uuid,
    pub metadata: serde_json::Value,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    /// Filter by kind.
    pub kind: Option<TransactionKind>,
    /// Filter by category.
    pub category: Option<TransactionCategory>,
    /// Filter by collaborator reference (kind + id).
    pub reference: Option<EntryRef>,
    /// Filter by creation instant, inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Filter by creation instant, inclusive upper bound.
    pub to: Option<DateTime<Utc>>,
}

/// Transaction repository (read-only query surface).
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a transaction row inside the caller's database transaction.
    ///
    /// Crate-private: only the ledger service may append to the log, and it
    /// must do so atomically with the owning cashbox's balance update.
    pub(crate) async fn insert<C>(
        conn: &C,
        new: NewTransaction,
    ) -> Result<transactions::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let row = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            cashbox_id: Set(new.cashbox_id),
            kind: Set(new.kind),
            amount: Set(new.amount),
            balance_after: Set(new.balance_after),
            category: Set(new.category),
            description: Set(new.description),
            reference_kind: Set(new.reference.map(|r| r.kind.as_str().to_owned())),
            reference_id: Set(new.reference.map(|r| r.id)),
            reversed_transaction_id: Set(new.reversed_transaction_id),
            created_by: Set(new.created_by),
            metadata: Set(new.metadata),
            created_at: Set(Utc::now().into()),
            // seq is assigned by the database
            ..Default::default()
        };

        row.insert(conn).await
    }

    /// Finds a transaction by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<transactions::Model>, LedgerError> {
        transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Gets a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if no transaction has the given ID.
    pub async fn get(&self, id: Uuid) -> Result<transactions::Model, LedgerError> {
        self.find_by_id(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    /// Lists a cashbox's transactions with optional filters, paginated,
    /// newest first.
    pub async fn list(
        &self,
        cashbox_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<transactions::Model>, LedgerError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::CashboxId.eq(cashbox_id));

        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind));
        }
        if let Some(category) = filter.category {
            query = query.filter(transactions::Column::Category.eq(category));
        }
        if let Some(reference) = filter.reference {
            query = query
                .filter(transactions::Column::ReferenceKind.eq(reference.kind.as_str()))
                .filter(transactions::Column::ReferenceId.eq(reference.id));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::CreatedAt.lte(to));
        }

        let query = query.order_by_desc(transactions::Column::Seq);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(db_err)?;

        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Finds the reversal of a transaction, if one exists.
    pub async fn reversal_of(
        &self,
        original_id: Uuid,
    ) -> Result<Option<transactions::Model>, LedgerError> {
        transactions::Entity::find()
            .filter(transactions::Column::ReversedTransactionId.eq(original_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Returns true if a reversal of the transaction exists.
    pub async fn is_reversed(&self, original_id: Uuid) -> Result<bool, LedgerError> {
        Ok(self.reversal_of(original_id).await?.is_some())
    }

    /// Finds all transactions recorded for a collaborator reference.
    pub async fn find_by_reference(
        &self,
        reference: EntryRef,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        transactions::Entity::find()
            .filter(transactions::Column::ReferenceKind.eq(reference.kind.as_str()))
            .filter(transactions::Column::ReferenceId.eq(reference.id))
            .order_by_asc(transactions::Column::Seq)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Loads a cashbox's full history in commit order.
    pub(crate) async fn history<C>(
        conn: &C,
        cashbox_id: Uuid,
    ) -> Result<Vec<transactions::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        transactions::Entity::find()
            .filter(transactions::Column::CashboxId.eq(cashbox_id))
            .order_by_asc(transactions::Column::Seq)
            .all(conn)
            .await
    }

    /// Loads a cashbox's history committed at or before `at`, in commit order.
    pub(crate) async fn history_through<C>(
        conn: &C,
        cashbox_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Vec<transactions::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        transactions::Entity::find()
            .filter(transactions::Column::CashboxId.eq(cashbox_id))
            .filter(transactions::Column::CreatedAt.lte(at))
            .order_by_asc(transactions::Column::Seq)
            .all(conn)
            .await
    }

    /// Loads a cashbox's history committed strictly before `at`, in commit
    /// order.
    pub(crate) async fn history_before<C>(
        conn: &C,
        cashbox_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Vec<transactions::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        transactions::Entity::find()
            .filter(transactions::Column::CashboxId.eq(cashbox_id))
            .filter(transactions::Column::CreatedAt.lt(at))
            .order_by_asc(transactions::Column::Seq)
            .all(conn)
            .await
    }
}
