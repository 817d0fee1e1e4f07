//! Persistence boundary for emergency withdrawals.

use async_trait::async_trait;
use rust_decimal::Decimal;
use stokvel_shared::types::{StokvelId, UserId};

use super::error::StoreError;
use super::types::{Committed, EnrollmentRef, FundBalance, WithdrawalPlan};

/// Reads the withdrawal engine needs, and the entry point to a locked commit.
///
/// Implementations are passed into each operation explicitly; the engine
/// never holds a global connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Finds the member's enrollment in the fund.
    async fn find_enrollment(
        &self,
        user_id: UserId,
        stokvel_id: StokvelId,
    ) -> Result<Option<EnrollmentRef>, StoreError>;

    /// Finds the fund's current balance.
    async fn find_fund(&self, stokvel_id: StokvelId) -> Result<Option<FundBalance>, StoreError>;

    /// Signed sum of the member's payments to the fund (zero when none).
    async fn sum_payments(&self, user_id: UserId, stokvel_id: StokvelId)
    -> Result<Decimal, StoreError>;

    /// Opens a unit of work holding the fund's exclusive lock.
    ///
    /// The lock is taken before this returns and is held until the unit
    /// commits or rolls back, so every read made through the unit sees a
    /// balance no other writer can move.
    async fn begin_withdrawal(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Box<dyn WithdrawalUnit>, StoreError>;
}

/// One withdrawal's reads and write, all under the fund lock.
///
/// Dropping a unit without calling either `apply_withdrawal_mutation` or
/// `rollback` must release the lock and discard any partial work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalUnit: Send {
    /// Finds the member's enrollment in the locked fund.
    async fn find_enrollment(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<EnrollmentRef>, StoreError>;

    /// Balance of the locked fund, `None` if the fund does not exist.
    async fn find_fund(&mut self) -> Result<Option<FundBalance>, StoreError>;

    /// Signed sum of the member's payments to the locked fund.
    async fn sum_payments(&mut self, user_id: UserId) -> Result<Decimal, StoreError>;

    /// Applies the fund decrement, enrollment removal and debit entry, then
    /// commits and releases the lock.
    ///
    /// On error none of the three mutations may be observable.
    async fn apply_withdrawal_mutation(
        &mut self,
        plan: &WithdrawalPlan,
    ) -> Result<Committed, StoreError>;

    /// Discards the unit and releases the lock.
    async fn rollback(&mut self) -> Result<(), StoreError>;
}
