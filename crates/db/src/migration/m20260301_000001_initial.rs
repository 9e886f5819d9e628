//! Initial database migration.
//!
//! Creates the ledger enums, tables, indexes, and the posting triggers that
//! keep `accounts.current_balance` in step with posted lines.

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
        // PART 2: COMPANIES & CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS & LINES
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_LINES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
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
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE transaction_status AS ENUM ('draft', 'posted', 'voided');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    sub_type VARCHAR(100),
    parent_account_id UUID REFERENCES accounts(id) ON DELETE SET NULL,
    is_bank_account BOOLEAN NOT NULL DEFAULT false,
    is_control_account BOOLEAN NOT NULL DEFAULT false,
    is_system BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    tax_category VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, code),
    CHECK (parent_account_id IS NULL OR parent_account_id <> id)
);

CREATE INDEX idx_accounts_company_type ON accounts(company_id, account_type);
CREATE INDEX idx_accounts_parent ON accounts(parent_account_id) WHERE parent_account_id IS NOT NULL;
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference VARCHAR(100),
    status transaction_status NOT NULL DEFAULT 'draft',
    posted_at TIMESTAMPTZ,
    voided_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transactions_company_date ON transactions(company_id, transaction_date);
CREATE INDEX idx_transactions_company_status ON transactions(company_id, status);
";

const TRANSACTION_LINES_SQL: &str = r"
CREATE TABLE transaction_lines (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transaction_lines_transaction ON transaction_lines(transaction_id);
CREATE INDEX idx_transaction_lines_account ON transaction_lines(account_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: apply_transaction_status
-- Applies or reverses line sums on accounts.current_balance when a
-- transaction moves into or out of 'posted'. Posting requires lines
-- that sum to zero.
-- ============================================================
CREATE OR REPLACE FUNCTION apply_transaction_status()
RETURNS TRIGGER AS $$
DECLARE
    imbalance NUMERIC(19, 4);
BEGIN
    IF OLD.status = 'voided' AND NEW.status <> 'voided' THEN
        RAISE EXCEPTION 'Cannot modify voided transaction %', OLD.id;
    END IF;

    IF OLD.status = 'posted' AND NEW.status = 'draft' THEN
        RAISE EXCEPTION 'Cannot return posted transaction % to draft. Void it instead.', OLD.id;
    END IF;

    IF NEW.status = 'posted' AND OLD.status <> 'posted' THEN
        SELECT COALESCE(SUM(amount), 0) INTO imbalance
        FROM transaction_lines
        WHERE transaction_id = NEW.id;

        IF imbalance <> 0 THEN
            RAISE EXCEPTION 'Transaction % is not balanced. Difference: %', NEW.id, imbalance;
        END IF;

        UPDATE accounts a
        SET current_balance = a.current_balance + s.total,
            updated_at = now()
        FROM (
            SELECT account_id, SUM(amount) AS total
            FROM transaction_lines
            WHERE transaction_id = NEW.id
            GROUP BY account_id
        ) s
        WHERE a.id = s.account_id;

        NEW.posted_at := COALESCE(NEW.posted_at, now());
    ELSIF OLD.status = 'posted' AND NEW.status <> 'posted' THEN
        UPDATE accounts a
        SET current_balance = a.current_balance - s.total,
            updated_at = now()
        FROM (
            SELECT account_id, SUM(amount) AS total
            FROM transaction_lines
            WHERE transaction_id = NEW.id
            GROUP BY account_id
        ) s
        WHERE a.id = s.account_id;
    END IF;

    IF NEW.status = 'voided' AND OLD.status <> 'voided' THEN
        NEW.voided_at := COALESCE(NEW.voided_at, now());
    END IF;

    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_apply_transaction_status
BEFORE UPDATE OF status ON transactions
FOR EACH ROW
WHEN (OLD.status IS DISTINCT FROM NEW.status)
EXECUTE FUNCTION apply_transaction_status();

-- ============================================================
-- FUNCTION: prevent_line_modification
-- Lines may only change while their transaction is a draft
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_line_modification()
RETURNS TRIGGER AS $$
DECLARE
    txn_status transaction_status;
BEGIN
    SELECT status INTO txn_status
    FROM transactions
    WHERE id = COALESCE(NEW.transaction_id, OLD.transaction_id);

    IF txn_status IS NOT NULL AND txn_status <> 'draft' THEN
        RAISE EXCEPTION 'Cannot modify lines of % transaction', txn_status;
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_line_modification
BEFORE INSERT OR UPDATE OR DELETE ON transaction_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_line_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_prevent_line_modification ON transaction_lines;
DROP TRIGGER IF EXISTS trg_apply_transaction_status ON transactions;
DROP FUNCTION IF EXISTS prevent_line_modification();
DROP FUNCTION IF EXISTS apply_transaction_status();
DROP TABLE IF EXISTS transaction_lines;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS companies;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS account_type;
";
