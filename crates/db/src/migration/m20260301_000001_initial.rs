//! Initial database migration.
//!
//! Creates the ledger enums, the cashboxes and transactions tables, their
//! indexes, and the trigger that makes the transaction log append-only at
//! the storage layer.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CASHBOXES
        // ============================================================
        db.execute_unprepared(CASHBOXES_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS (append-only ledger)
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Transaction kinds
CREATE TYPE transaction_kind AS ENUM (
    'income',
    'expense',
    'reversal'
);

-- Transaction categories (closed set shared with collaborators)
CREATE TYPE transaction_category AS ENUM (
    'payment',
    'custody_deposit',
    'custody_return',
    'custody_forfeiture',
    'expense',
    'receivable_payment',
    'salary_expense',
    'reversal',
    'initial_balance',
    'adjustment'
);
";

const CASHBOXES_SQL: &str = r"
CREATE TABLE cashboxes (
    id UUID PRIMARY KEY,
    branch_id UUID,
    name TEXT NOT NULL,
    initial_balance NUMERIC(19, 4) NOT NULL DEFAULT 0
        CONSTRAINT cashboxes_initial_balance_non_negative CHECK (initial_balance >= 0),
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cashboxes_branch_id ON cashboxes (branch_id);
CREATE INDEX idx_cashboxes_is_active ON cashboxes (is_active);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    -- storage-assigned insertion counter; per cashbox it strictly
    -- increases in commit order
    seq BIGINT GENERATED ALWAYS AS IDENTITY,
    cashbox_id UUID NOT NULL REFERENCES cashboxes (id) ON DELETE RESTRICT,
    kind transaction_kind NOT NULL,
    amount NUMERIC(19, 4) NOT NULL
        CONSTRAINT transactions_amount_positive CHECK (amount > 0),
    balance_after NUMERIC(19, 4) NOT NULL,
    category transaction_category NOT NULL,
    description TEXT NOT NULL,
    reference_kind TEXT,
    reference_id UUID,
    -- at most one reversal per original
    reversed_transaction_id UUID UNIQUE REFERENCES transactions (id),
    created_by UUID NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT transactions_reference_pair
        CHECK ((reference_kind IS NULL) = (reference_id IS NULL))
);

CREATE INDEX idx_transactions_cashbox_seq ON transactions (cashbox_id, seq);
CREATE INDEX idx_transactions_reference ON transactions (reference_kind, reference_id);
CREATE INDEX idx_transactions_category ON transactions (category);
CREATE INDEX idx_transactions_created_at ON transactions (created_at);
";

const TRIGGERS_SQL: &str = r"
-- The transaction log is append-only: no row may ever change or disappear.
CREATE FUNCTION forbid_transaction_mutation() RETURNS trigger AS $$
BEGIN
    RAISE EXCEPTION 'ledger transactions are append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER transactions_append_only
    BEFORE UPDATE OR DELETE ON transactions
    FOR EACH ROW
    EXECUTE FUNCTION forbid_transaction_mutation();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS transactions_append_only ON transactions;
DROP FUNCTION IF EXISTS forbid_transaction_mutation();
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS cashboxes;
DROP TYPE IF EXISTS transaction_category;
DROP TYPE IF EXISTS transaction_kind;
";
