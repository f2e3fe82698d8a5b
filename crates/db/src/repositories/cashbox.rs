//! Cashbox repository.
//!
//! Read-mostly: creation and the active flag are the only writes exposed
//! here. `current_balance` has no setter in this repository; it is written
//! exclusively by the [`super::Ledger`] service inside its atomic unit.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use registra_core::ledger::LedgerError;

use super::db_err;
use crate::entities::cashboxes;

/// Input for provisioning a cashbox.
#[derive(Debug, Clone)]
pub struct CreateCashboxInput {
    /// Owning branch, if any.
    pub branch_id: Option<Uuid>,
    /// Display name of the register.
    pub name: String,
    /// Opening amount; set once, never changed afterwards.
    pub initial_balance: Decimal,
}

/// Filter options for listing cashboxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashboxFilter {
    /// Filter by owning branch.
    pub branch_id: Option<Uuid>,
    /// Filter by active flag.
    pub is_active: Option<bool>,
}

/// Cashbox repository.
#[derive(Debug, Clone)]
pub struct CashboxRepository {
    db: DatabaseConnection,
}

impl CashboxRepository {
    /// Creates a new cashbox repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Provisions a new cashbox. `current_balance` starts at the initial
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if the initial balance is negative.
    pub async fn create(
        &self,
        input: CreateCashboxInput,
    ) -> Result<cashboxes::Model, LedgerError> {
        if input.initial_balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(input.initial_balance));
        }

        let now = Utc::now().into();
        let cashbox = cashboxes::ActiveModel {
            id: Set(Uuid::now_v7()),
            branch_id: Set(input.branch_id),
            name: Set(input.name),
            initial_balance: Set(input.initial_balance),
            current_balance: Set(input.initial_balance),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        cashbox.insert(&self.db).await.map_err(db_err)
    }

    /// Finds a cashbox by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<cashboxes::Model>, LedgerError> {
        cashboxes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Gets a cashbox by ID.
    ///
    /// # Errors
    ///
    /// Returns `CashboxNotFound` if no cashbox has the given ID.
    pub async fn get(&self, id: Uuid) -> Result<cashboxes::Model, LedgerError> {
        self.find_by_id(id)
            .await?
            .ok_or(LedgerError::CashboxNotFound(id))
    }

    /// Lists cashboxes with optional filters, newest first.
    pub async fn list(&self, filter: CashboxFilter) -> Result<Vec<cashboxes::Model>, LedgerError> {
        let mut query = cashboxes::Entity::find();

        if let Some(branch_id) = filter.branch_id {
            query = query.filter(cashboxes::Column::BranchId.eq(branch_id));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(cashboxes::Column::IsActive.eq(is_active));
        }

        query
            .order_by_desc(cashboxes::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Toggles the active flag. Deactivation suspends further writes but
    /// does not invalidate past transactions.
    ///
    /// # Errors
    ///
    /// Returns `CashboxNotFound` if no cashbox has the given ID.
    pub async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> Result<cashboxes::Model, LedgerError> {
        let cashbox = self.get(id).await?;

        let mut active: cashboxes::ActiveModel = cashbox.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }
}
