//! Emergency withdrawal orchestration.

use tracing::{info, warn};

use super::calculator;
use super::error::WithdrawalError;
use super::locks::FundLocks;
use super::store::{WithdrawalStore, WithdrawalUnit};
use super::types::{WithdrawalQuote, WithdrawalReceipt, WithdrawalRequest};

/// Runs withdrawals against a caller-supplied store.
///
/// The service owns only the per-fund lock table; every call receives the
/// store it should read from and write to.
#[derive(Debug, Default, Clone)]
pub struct WithdrawalService {
    locks: FundLocks,
}

impl WithdrawalService {
    /// Creates a service with an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes what a withdrawal would pay out, without changing anything.
    ///
    /// Never opens a [`WithdrawalUnit`], so nothing is locked or written.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors `execute` would, or `Persistence`
    /// if a read fails.
    pub async fn simulate<S>(
        &self,
        store: &S,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalQuote, WithdrawalError>
    where
        S: WithdrawalStore + ?Sized,
    {
        Self::quote(store, request).await
    }

    /// Performs an emergency withdrawal.
    ///
    /// The fund's lock is taken before anything is read: the in-process lock
    /// first, then the store's row lock through
    /// [`WithdrawalStore::begin_withdrawal`]. Validation and commit both run
    /// against the locked balance, so concurrent withdrawals against one fund
    /// queue instead of racing, even across processes.
    ///
    /// # Errors
    ///
    /// Validation errors roll the unit back and leave state untouched.
    /// `Persistence` means the atomic commit was rolled back.
    pub async fn execute<S>(
        &self,
        store: &S,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalReceipt, WithdrawalError>
    where
        S: WithdrawalStore + ?Sized,
    {
        let _guard = self.locks.acquire(request.stokvel_id).await;
        let mut unit = store.begin_withdrawal(request.stokvel_id).await?;

        let validated = Self::quote_locked(unit.as_mut(), request)
            .await
            .and_then(|quote| calculator::plan(&quote).map(|plan| (quote, plan)));
        let (quote, plan) = match validated {
            Ok(validated) => validated,
            Err(e) => {
                if let Err(rollback) = unit.rollback().await {
                    warn!(
                        stokvel_id = %request.stokvel_id,
                        error = %rollback,
                        "Withdrawal rollback failed"
                    );
                }
                return Err(e);
            }
        };

        let committed = unit
            .apply_withdrawal_mutation(&plan)
            .await
            .inspect_err(|e| {
                warn!(
                    user_id = %request.user_id,
                    stokvel_id = %request.stokvel_id,
                    error = %e,
                    "Emergency withdrawal commit failed"
                );
            })?;

        info!(
            user_id = %request.user_id,
            stokvel_id = %request.stokvel_id,
            withdrawal_amount = %quote.withdrawal_amount,
            remaining_fund_value = plan.new_net_value,
            "Emergency withdrawal committed"
        );

        Ok(WithdrawalReceipt {
            total_contributions: quote.total_contributions,
            penalty_amount: quote.penalty_amount,
            withdrawal_amount: quote.withdrawal_amount,
            remaining_fund_value: plan.new_net_value,
            payment_id: committed.payment_id,
        })
    }

    async fn quote_locked(
        unit: &mut dyn WithdrawalUnit,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalQuote, WithdrawalError> {
        let WithdrawalRequest {
            user_id,
            stokvel_id,
        } = request;

        let enrollment = unit
            .find_enrollment(user_id)
            .await?
            .ok_or(WithdrawalError::NotEnrolled {
                user_id,
                stokvel_id,
            })?;

        let fund = unit
            .find_fund()
            .await?
            .ok_or(WithdrawalError::FundNotFound(stokvel_id))?;

        let total = unit.sum_payments(user_id).await?;

        calculator::quote(&enrollment, &fund, total)
    }

    async fn quote<S>(store: &S, request: WithdrawalRequest) -> Result<WithdrawalQuote, WithdrawalError>
    where
        S: WithdrawalStore + ?Sized,
    {
        let WithdrawalRequest {
            user_id,
            stokvel_id,
        } = request;

        let enrollment = store
            .find_enrollment(user_id, stokvel_id)
            .await?
            .ok_or(WithdrawalError::NotEnrolled {
                user_id,
                stokvel_id,
            })?;

        let fund = store
            .find_fund(stokvel_id)
            .await?
            .ok_or(WithdrawalError::FundNotFound(stokvel_id))?;

        let total = store.sum_payments(user_id, stokvel_id).await?;

        calculator::quote(&enrollment, &fund, total)
    }
}
