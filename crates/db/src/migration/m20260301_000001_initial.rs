//! Initial schema: users, stokvels, enrollments and the payment ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS payments, stokvel_enrollments, stokvels, users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    surname VARCHAR(100) NOT NULL,
    email VARCHAR(255) UNIQUE,
    id_number VARCHAR(20),
    password_hash TEXT NOT NULL,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE stokvels (
    id UUID PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    number_people INTEGER NOT NULL,
    goal TEXT NOT NULL,
    monthly_contribution NUMERIC(14, 2) NOT NULL,
    net_value BIGINT NOT NULL DEFAULT 0,
    interest_rate NUMERIC(5, 2) NOT NULL DEFAULT 0,
    started_at TIMESTAMPTZ NOT NULL,
    end_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_stokvels_net_value CHECK (net_value >= 0),
    CONSTRAINT chk_stokvels_number_people CHECK (number_people >= 1),
    CONSTRAINT chk_stokvels_monthly_contribution CHECK (monthly_contribution > 0),
    CONSTRAINT chk_stokvels_interest_rate CHECK (interest_rate >= 0),
    CONSTRAINT chk_stokvels_end_after_start CHECK (end_at IS NULL OR end_at > started_at)
);

CREATE TABLE stokvel_enrollments (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    stokvel_id UUID NOT NULL REFERENCES stokvels(id) ON DELETE CASCADE,
    is_admin BOOLEAN NOT NULL DEFAULT false,
    enrolled_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_enrollments_user_stokvel UNIQUE (user_id, stokvel_id)
);

CREATE INDEX idx_enrollments_stokvel ON stokvel_enrollments(stokvel_id);

-- Append-only ledger. Withdrawals are negative rows at full precision.
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    stokvel_id UUID NOT NULL REFERENCES stokvels(id) ON DELETE RESTRICT,
    amount NUMERIC NOT NULL,
    paid_at TIMESTAMPTZ NOT NULL,
    paid_offset_seconds INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payments_amount_non_zero CHECK (amount <> 0),
    CONSTRAINT chk_payments_offset_range CHECK (paid_offset_seconds BETWEEN -86399 AND 86399)
);

-- Net position lookups by the withdrawal engine
CREATE INDEX idx_payments_member ON payments(user_id, stokvel_id);

-- Newest-first history
CREATE INDEX idx_payments_stokvel_paid ON payments(stokvel_id, paid_at DESC);
CREATE INDEX idx_payments_paid ON payments(paid_at DESC);
";
