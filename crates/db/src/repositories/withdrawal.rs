//! Postgres-backed emergency withdrawal store.
//!
//! A withdrawal runs in one transaction that starts by locking the fund row
//! `FOR UPDATE`. The enrollment and payment reads, the balance write, the
//! enrollment delete and the debit insert all happen inside it, so a second
//! withdrawal against the same fund, from any process, waits for the first
//! to commit and then sees its result. Any failure rolls everything back.

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use stokvel_core::contribution::recorded_at;
use stokvel_core::withdrawal::{
    Committed, EnrollmentRef, FundBalance, StoreError, WithdrawalPlan, WithdrawalStore,
    WithdrawalUnit,
};
use stokvel_shared::types::{EnrollmentId, PaymentId, StokvelId, UserId};
use tracing::{debug, warn};

use super::payment::new_payment;
use crate::entities::{payments, stokvel_enrollments, stokvels};

#[allow(clippy::needless_pass_by_value)]
fn db_err(e: DbErr) -> StoreError {
    StoreError::Database(e.to_string())
}

fn closed() -> StoreError {
    StoreError::Database("withdrawal transaction already finished".to_string())
}

async fn enrollment_of<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    stokvel_id: StokvelId,
) -> Result<Option<EnrollmentRef>, StoreError> {
    let enrollment = stokvel_enrollments::Entity::find()
        .filter(stokvel_enrollments::Column::UserId.eq(user_id.into_inner()))
        .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id.into_inner()))
        .one(conn)
        .await
        .map_err(db_err)?;

    Ok(enrollment.map(|e| EnrollmentRef {
        id: EnrollmentId::from(e.id),
        user_id: UserId::from(e.user_id),
        stokvel_id: StokvelId::from(e.stokvel_id),
    }))
}

fn balance_of(stokvel: stokvels::Model) -> FundBalance {
    FundBalance {
        stokvel_id: StokvelId::from(stokvel.id),
        net_value: stokvel.net_value,
    }
}

async fn payments_total<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    stokvel_id: StokvelId,
) -> Result<Decimal, StoreError> {
    let total: Option<Option<Decimal>> = payments::Entity::find()
        .filter(payments::Column::UserId.eq(user_id.into_inner()))
        .filter(payments::Column::StokvelId.eq(stokvel_id.into_inner()))
        .select_only()
        .column_as(Expr::col(payments::Column::Amount).sum(), "total")
        .into_tuple()
        .one(conn)
        .await
        .map_err(db_err)?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

/// [`WithdrawalStore`] over a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct PgWithdrawalStore {
    db: DatabaseConnection,
    timezone: Tz,
}

impl PgWithdrawalStore {
    /// Creates a store that stamps debits in `timezone`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, timezone: Tz) -> Self {
        Self { db, timezone }
    }
}

#[async_trait]
impl WithdrawalStore for PgWithdrawalStore {
    async fn find_enrollment(
        &self,
        user_id: UserId,
        stokvel_id: StokvelId,
    ) -> Result<Option<EnrollmentRef>, StoreError> {
        enrollment_of(&self.db, user_id, stokvel_id).await
    }

    async fn find_fund(&self, stokvel_id: StokvelId) -> Result<Option<FundBalance>, StoreError> {
        let stokvel = stokvels::Entity::find_by_id(stokvel_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(stokvel.map(balance_of))
    }

    async fn sum_payments(
        &self,
        user_id: UserId,
        stokvel_id: StokvelId,
    ) -> Result<Decimal, StoreError> {
        payments_total(&self.db, user_id, stokvel_id).await
    }

    async fn begin_withdrawal(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Box<dyn WithdrawalUnit>, StoreError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let fund = match stokvels::Entity::find_by_id(stokvel_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
        {
            Ok(fund) => fund.map(balance_of),
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(stokvel_id = %stokvel_id, error = %rollback, "Rollback failed");
                }
                return Err(db_err(e));
            }
        };

        debug!(
            stokvel_id = %stokvel_id,
            net_value = fund.map(|f| f.net_value),
            "Fund locked for withdrawal"
        );

        Ok(Box::new(PgWithdrawalUnit {
            txn: Some(txn),
            stokvel_id,
            fund,
            timezone: self.timezone,
        }))
    }
}

/// A withdrawal transaction holding the fund row lock.
struct PgWithdrawalUnit {
    txn: Option<DatabaseTransaction>,
    stokvel_id: StokvelId,
    fund: Option<FundBalance>,
    timezone: Tz,
}

impl PgWithdrawalUnit {
    fn txn(&self) -> Result<&DatabaseTransaction, StoreError> {
        self.txn.as_ref().ok_or_else(closed)
    }

    async fn write_plan(
        &self,
        txn: &DatabaseTransaction,
        plan: &WithdrawalPlan,
    ) -> Result<payments::Model, StoreError> {
        let locked = self.fund.ok_or(StoreError::FundMissing(plan.stokvel_id))?;
        if plan.stokvel_id != self.stokvel_id || locked.net_value != plan.previous_net_value {
            warn!(
                stokvel_id = %plan.stokvel_id,
                expected = plan.previous_net_value,
                actual = locked.net_value,
                "Withdrawal plan does not match the locked fund"
            );
            return Err(StoreError::StaleBalance {
                stokvel_id: plan.stokvel_id,
                expected: plan.previous_net_value,
                actual: locked.net_value,
            });
        }

        stokvels::Entity::update_many()
            .col_expr(stokvels::Column::NetValue, Expr::value(plan.new_net_value))
            .filter(stokvels::Column::Id.eq(self.stokvel_id.into_inner()))
            .exec(txn)
            .await
            .map_err(db_err)?;

        let deleted = stokvel_enrollments::Entity::delete_many()
            .filter(stokvel_enrollments::Column::Id.eq(plan.enrollment_id.into_inner()))
            .filter(stokvel_enrollments::Column::StokvelId.eq(self.stokvel_id.into_inner()))
            .exec(txn)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected == 0 {
            return Err(StoreError::EnrollmentMissing(plan.enrollment_id));
        }

        let paid_at = recorded_at(Utc::now(), self.timezone);
        new_payment(
            plan.payment.user_id.into_inner(),
            plan.payment.stokvel_id.into_inner(),
            plan.payment.amount,
            paid_at,
        )
        .insert(txn)
        .await
        .map_err(db_err)
    }
}

#[async_trait]
impl WithdrawalUnit for PgWithdrawalUnit {
    async fn find_enrollment(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<EnrollmentRef>, StoreError> {
        enrollment_of(self.txn()?, user_id, self.stokvel_id).await
    }

    async fn find_fund(&mut self) -> Result<Option<FundBalance>, StoreError> {
        self.txn().map(|_| self.fund)
    }

    async fn sum_payments(&mut self, user_id: UserId) -> Result<Decimal, StoreError> {
        payments_total(self.txn()?, user_id, self.stokvel_id).await
    }

    async fn apply_withdrawal_mutation(
        &mut self,
        plan: &WithdrawalPlan,
    ) -> Result<Committed, StoreError> {
        let txn = self.txn.take().ok_or_else(closed)?;

        let payment = match self.write_plan(&txn, plan).await {
            Ok(payment) => payment,
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(stokvel_id = %self.stokvel_id, error = %rollback, "Rollback failed");
                }
                return Err(e);
            }
        };

        txn.commit().await.map_err(db_err)?;

        debug!(
            stokvel_id = %plan.stokvel_id,
            payment_id = %payment.id,
            new_net_value = plan.new_net_value,
            "Withdrawal mutation committed"
        );

        Ok(Committed {
            payment_id: PaymentId::from(payment.id),
        })
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        match self.txn.take() {
            Some(txn) => txn.rollback().await.map_err(db_err),
            None => Ok(()),
        }
    }
}
