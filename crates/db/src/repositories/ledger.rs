//! The ledger service: the only writer of cashbox balances.
//!
//! Every public operation is one indivisible step. Writers serialize on the
//! per-cashbox [`LockRegistry`], re-read the cashbox row with `SELECT ...
//! FOR UPDATE` inside a database transaction, validate against the core
//! rules, and commit the transaction insert and the balance update as one
//! atomic unit. Either both land or neither does.
//!
//! Read-only operations (`balance_at_date`, `daily_summary`) take no lock
//! and may observe a balance that is in the middle of being superseded.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use registra_core::ledger::{
    CashboxInfo, DailySummary, EntryInput, EntryView, LedgerError, LedgerService,
    TransactionKind,
};
use registra_shared::types::{ActorId, CashboxId};

use super::db_err;
use super::lock::LockRegistry;
use super::transaction::{NewTransaction, TransactionRepository};
use crate::entities::{cashboxes, sea_orm_active_enums, transactions};

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// The reconciled cashbox.
    pub cashbox_id: Uuid,
    /// Stored balance before reconciliation.
    pub previous_balance: Decimal,
    /// Balance recomputed from the full transaction history.
    pub computed_balance: Decimal,
    /// True if the stored balance had drifted and was corrected.
    pub drifted: bool,
}

/// Orchestrates atomic balance transitions for cashboxes.
pub struct Ledger {
    db: DatabaseConnection,
    locks: LockRegistry,
}

impl Ledger {
    /// Creates a ledger service over the given connection.
    #[must_use]
    pub fn new(db: DatabaseConnection, lock_timeout: Duration) -> Self {
        Self {
            db,
            locks: LockRegistry::new(lock_timeout),
        }
    }

    /// Records money flowing into a cashbox.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `CashboxNotFound`, `InactiveCashbox`, or
    /// `LockTimeout`. No partial state is left behind on failure.
    pub async fn record_income(
        &self,
        cashbox_id: Uuid,
        input: EntryInput,
    ) -> Result<transactions::Model, LedgerError> {
        self.record(cashbox_id, input, TransactionKind::Income).await
    }

    /// Records money flowing out of a cashbox.
    ///
    /// # Errors
    ///
    /// As [`Self::record_income`], plus `InsufficientBalance` when the
    /// cashbox does not hold the amount; the cashbox is left untouched.
    pub async fn record_expense(
        &self,
        cashbox_id: Uuid,
        input: EntryInput,
    ) -> Result<transactions::Model, LedgerError> {
        self.record(cashbox_id, input, TransactionKind::Expense).await
    }

    async fn record(
        &self,
        cashbox_id: Uuid,
        input: EntryInput,
        kind: TransactionKind,
    ) -> Result<transactions::Model, LedgerError> {
        // Input validation happens before any lock is taken.
        LedgerService::validate_amount(input.amount)?;

        // Cheap pre-checks without the lock; both are re-validated under it.
        let cashbox = self.load_cashbox(&self.db, cashbox_id, false).await?;
        LedgerService::validate_active(&cashbox_info(&cashbox))?;

        let _guard = self.locks.acquire(cashbox_id).await?;
        let txn = self.db.begin().await.map_err(db_err)?;

        // Re-read under the row lock; the balance may have moved since the
        // pre-check.
        let cashbox = self.load_cashbox(&txn, cashbox_id, true).await?;
        LedgerService::validate_active(&cashbox_info(&cashbox))?;

        let new_balance = match kind {
            TransactionKind::Income => {
                LedgerService::income_balance(cashbox.current_balance, input.amount)
            }
            TransactionKind::Expense => {
                LedgerService::expense_balance(cashbox.current_balance, input.amount)?
            }
            TransactionKind::Reversal => {
                return Err(LedgerError::Internal(
                    "reversals are recorded via reverse_transaction".to_string(),
                ));
            }
        };

        let row = TransactionRepository::insert(
            &txn,
            NewTransaction {
                cashbox_id,
                kind: kind.into(),
                amount: input.amount,
                balance_after: new_balance,
                category: input.category.into(),
                description: input.description,
                reference: input.reference,
                reversed_transaction_id: None,
                created_by: input.actor.into_inner(),
                metadata: input.metadata.unwrap_or_else(|| json!({})),
            },
        )
        .await
        .map_err(db_err)?;

        Self::write_balance(&txn, cashbox, new_balance).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            %cashbox_id,
            kind = %kind,
            amount = %input.amount,
            balance = %new_balance,
            "recorded ledger entry"
        );
        Ok(row)
    }

    /// Reverses a prior income or expense with a first-class counter-entry.
    ///
    /// The original remains forever as recorded; the reversal links back to
    /// it and carries the inverse balance effect.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `CannotReverseReversal`,
    /// `AlreadyReversed`, `InsufficientBalance` (when reversing an income
    /// the cashbox can no longer cover), or `LockTimeout`.
    pub async fn reverse_transaction(
        &self,
        original_id: Uuid,
        reason: &str,
        actor: ActorId,
    ) -> Result<transactions::Model, LedgerError> {
        let repo = TransactionRepository::new(self.db.clone());
        let original = repo.get(original_id).await?;
        let original_kind = TransactionKind::from(original.kind);
        let original_category = original.category;

        // Fast pre-checks without the lock; re-validated under it.
        let already = repo.is_reversed(original_id).await?;
        LedgerService::validate_reversal(original_id, original_kind, already)?;

        let cashbox_id = original.cashbox_id;
        let _guard = self.locks.acquire(cashbox_id).await?;
        let txn = self.db.begin().await.map_err(db_err)?;

        let cashbox = self.load_cashbox(&txn, cashbox_id, true).await?;

        // Re-check under the lock; the unique constraint on
        // reversed_transaction_id is the cross-process backstop.
        let already = transactions::Entity::find()
            .filter(transactions::Column::ReversedTransactionId.eq(original_id))
            .one(&txn)
            .await
            .map_err(db_err)?
            .is_some();
        LedgerService::validate_reversal(original_id, original_kind, already)?;

        let new_balance = LedgerService::reversal_balance(
            cashbox.current_balance,
            original_id,
            original_kind,
            original.amount,
        )?;

        let reference = original.reference_kind.as_deref().and_then(|tag| {
            let id = original.reference_id?;
            let kind = tag.parse::<registra_core::ledger::ReferenceKind>().ok()?;
            Some(registra_core::ledger::EntryRef { kind, id })
        });

        let row = TransactionRepository::insert(
            &txn,
            NewTransaction {
                cashbox_id,
                kind: sea_orm_active_enums::TransactionKind::Reversal,
                amount: original.amount,
                balance_after: new_balance,
                category: sea_orm_active_enums::TransactionCategory::Reversal,
                description: LedgerService::reversal_description(original_id, reason),
                reference,
                reversed_transaction_id: Some(original_id),
                created_by: actor.into_inner(),
                metadata: LedgerService::reversal_metadata(
                    original_id,
                    original_kind,
                    original_category.into(),
                    reason,
                ),
            },
        )
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                LedgerError::AlreadyReversed(original_id)
            }
            _ => db_err(e),
        })?;

        Self::write_balance(&txn, cashbox, new_balance).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            %cashbox_id,
            %original_id,
            amount = %original.amount,
            balance = %new_balance,
            "reversed ledger entry"
        );
        Ok(row)
    }

    /// Recomputes a cashbox's balance from its full history and corrects
    /// the stored value if it has drifted. Idempotent.
    ///
    /// Runs under the same per-cashbox lock as the write paths.
    ///
    /// # Errors
    ///
    /// Returns `CashboxNotFound` or `LockTimeout`.
    pub async fn reconcile(&self, cashbox_id: Uuid) -> Result<ReconcileReport, LedgerError> {
        let _guard = self.locks.acquire(cashbox_id).await?;
        let txn = self.db.begin().await.map_err(db_err)?;

        let cashbox = self.load_cashbox(&txn, cashbox_id, true).await?;
        let history = TransactionRepository::history(&txn, cashbox_id)
            .await
            .map_err(db_err)?;
        let views = entry_views(&history)?;

        let previous_balance = cashbox.current_balance;
        let computed_balance = LedgerService::balance_as_of(cashbox.initial_balance, &views)?;
        let drifted = computed_balance != previous_balance;

        if drifted {
            warn!(
                %cashbox_id,
                stored = %previous_balance,
                computed = %computed_balance,
                "balance drift detected, correcting"
            );
            Self::write_balance(&txn, cashbox, computed_balance).await?;
        }
        txn.commit().await.map_err(db_err)?;

        Ok(ReconcileReport {
            cashbox_id,
            previous_balance,
            computed_balance,
            drifted,
        })
    }

    /// Computes a cashbox's balance as of an instant, from the history
    /// created at or before it. Pure read: never writes, takes no lock.
    ///
    /// # Errors
    ///
    /// Returns `CashboxNotFound`.
    pub async fn balance_at_date(
        &self,
        cashbox_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Decimal, LedgerError> {
        let cashbox = self.load_cashbox(&self.db, cashbox_id, false).await?;
        let history = TransactionRepository::history_through(&self.db, cashbox_id, at)
            .await
            .map_err(db_err)?;
        let views = entry_views(&history)?;

        LedgerService::balance_as_of(cashbox.initial_balance, &views)
    }

    /// Derives the daily summary for a cashbox. Pure read, UTC day bounds.
    ///
    /// # Errors
    ///
    /// Returns `CashboxNotFound`, or `Internal` for an unrepresentable date.
    pub async fn daily_summary(
        &self,
        cashbox_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailySummary, LedgerError> {
        let cashbox = self.load_cashbox(&self.db, cashbox_id, false).await?;

        let day_start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| LedgerError::Internal(format!("unrepresentable date: {date}")))?
            .and_utc();
        let day_end = day_start
            .checked_add_days(Days::new(1))
            .ok_or_else(|| LedgerError::Internal(format!("unrepresentable date: {date}")))?;

        let history = TransactionRepository::history_before(&self.db, cashbox_id, day_end)
            .await
            .map_err(db_err)?;

        // The kind map covers the whole prefix so day-entries reversing
        // earlier days resolve too.
        let views = entry_views(&history)?;
        let day_from = history
            .iter()
            .position(|t| t.created_at.with_timezone(&Utc) >= day_start)
            .unwrap_or(history.len());

        let opening =
            LedgerService::balance_as_of(cashbox.initial_balance, &views[..day_from])?;
        LedgerService::summarize_day(date, opening, &views[day_from..])
    }

    async fn load_cashbox<C>(
        &self,
        conn: &C,
        cashbox_id: Uuid,
        for_update: bool,
    ) -> Result<cashboxes::Model, LedgerError>
    where
        C: ConnectionTrait,
    {
        let mut query = cashboxes::Entity::find_by_id(cashbox_id);
        if for_update {
            query = query.lock_exclusive();
        }
        query
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::CashboxNotFound(cashbox_id))
    }

    async fn write_balance(
        txn: &DatabaseTransaction,
        cashbox: cashboxes::Model,
        new_balance: Decimal,
    ) -> Result<(), LedgerError> {
        let mut active: cashboxes::ActiveModel = cashbox.into();
        active.current_balance = Set(new_balance);
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await.map_err(db_err)?;
        Ok(())
    }
}

/// Converts cashbox rows into the core validation snapshot.
fn cashbox_info(cashbox: &cashboxes::Model) -> CashboxInfo {
    CashboxInfo {
        id: CashboxId::from_uuid(cashbox.id),
        is_active: cashbox.is_active,
        current_balance: cashbox.current_balance,
    }
}

/// Converts persisted rows into replay views, resolving each reversal's
/// target kind from the same history prefix.
fn entry_views(history: &[transactions::Model]) -> Result<Vec<EntryView>, LedgerError> {
    let kinds: HashMap<Uuid, TransactionKind> = history
        .iter()
        .map(|t| (t.id, TransactionKind::from(t.kind)))
        .collect();

    history
        .iter()
        .map(|t| {
            let reversed_kind = match t.reversed_transaction_id {
                Some(original_id) => Some(*kinds.get(&original_id).ok_or_else(|| {
                    LedgerError::Internal(format!(
                        "reversal {} points at unknown transaction {original_id}",
                        t.id
                    ))
                })?),
                None => None,
            };
            Ok(EntryView {
                kind: TransactionKind::from(t.kind),
                amount: t.amount,
                reversed_kind,
            })
        })
        .collect()
}
