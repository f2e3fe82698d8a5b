//! `SeaORM` entity definitions.

pub mod cashboxes;
pub mod sea_orm_active_enums;
pub mod transactions;
