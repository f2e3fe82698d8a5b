//! `SeaORM` Entity for the transactions table.
//!
//! Rows in this table are append-only: there is no `updated_at`, the
//! repository exposes no update or delete operation, and the behavior hooks
//! below reject any non-insert save or delete that reaches the ORM layer.
//! A database trigger installed by the initial migration backs both up.

use sea_orm::ConnectionTrait;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TransactionCategory, TransactionKind};

/// Marker embedded in the `DbErr` raised for append-only violations.
pub const IMMUTABLE_VIOLATION: &str = "ledger transactions are append-only";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Storage-assigned insertion counter. Per cashbox this strictly
    /// increases in commit order, giving the total order over which the
    /// `balance_after` chain is defined.
    pub seq: i64,
    pub cashbox_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub category: TransactionCategory,
    pub description: String,
    pub reference_kind: Option<String>,
    pub reference_id: Option<Uuid>,
    pub reversed_transaction_id: Option<Uuid>,
    pub created_by: Uuid,
    pub metadata: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cashboxes::Entity",
        from = "Column::CashboxId",
        to = "super::cashboxes::Column::Id"
    )]
    Cashboxes,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ReversedTransactionId",
        to = "Column::Id"
    )]
    ReversedTransaction,
}

impl Related<super::cashboxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashboxes.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            Ok(self)
        } else {
            Err(DbErr::Custom(IMMUTABLE_VIOLATION.to_owned()))
        }
    }

    async fn before_delete<C>(self, _db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        Err(DbErr::Custom(IMMUTABLE_VIOLATION.to_owned()))
    }
}
