//! Pure withdrawal arithmetic.
//!
//! Nothing here reads or writes state: the service feeds in what the store
//! returned and applies the resulting plan.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::WithdrawalError;
use super::types::{EnrollmentRef, FundBalance, NewPayment, WithdrawalPlan, WithdrawalQuote};

/// Fixed penalty withheld from an emergency withdrawal (10%).
pub const EMERGENCY_PENALTY_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Splits a member's net position into `(penalty, payout)`.
///
/// Both parts are exact; `penalty + payout == total`.
#[must_use]
pub fn penalty_split(total_contributions: Decimal) -> (Decimal, Decimal) {
    let penalty = total_contributions * EMERGENCY_PENALTY_RATE;
    (penalty, total_contributions - penalty)
}

/// Validates a withdrawal against the member's position and the fund balance.
///
/// The caller has already established that the enrollment and fund exist.
///
/// # Errors
///
/// - `NoContributions` when `total_contributions <= 0`
/// - `InsufficientFundLiquidity` when the fund holds less than the payout
pub fn quote(
    enrollment: &EnrollmentRef,
    fund: &FundBalance,
    total_contributions: Decimal,
) -> Result<WithdrawalQuote, WithdrawalError> {
    if total_contributions <= Decimal::ZERO {
        return Err(WithdrawalError::NoContributions);
    }

    let (penalty_amount, withdrawal_amount) = penalty_split(total_contributions);

    if Decimal::from(fund.net_value) < withdrawal_amount {
        return Err(WithdrawalError::InsufficientFundLiquidity {
            available: fund.net_value,
        });
    }

    Ok(WithdrawalQuote {
        user_id: enrollment.user_id,
        stokvel_id: fund.stokvel_id,
        enrollment_id: enrollment.id,
        total_contributions,
        penalty_rate: EMERGENCY_PENALTY_RATE,
        penalty_amount,
        withdrawal_amount,
        current_fund_value: fund.net_value,
    })
}

/// Builds the atomic mutation plan for an accepted quote.
///
/// The fund's integer balance is decremented by the payout truncated toward
/// zero; the ledger entry carries the payout at full precision.
///
/// # Errors
///
/// Returns `Internal` if the truncated payout does not fit in an `i64`.
pub fn plan(quote: &WithdrawalQuote) -> Result<WithdrawalPlan, WithdrawalError> {
    let debit = quote.withdrawal_amount.trunc().to_i64().ok_or_else(|| {
        WithdrawalError::Internal(format!(
            "withdrawal amount {} out of range",
            quote.withdrawal_amount
        ))
    })?;

    let new_net_value = quote.current_fund_value.checked_sub(debit).ok_or_else(|| {
        WithdrawalError::Internal("fund balance underflow".to_string())
    })?;

    Ok(WithdrawalPlan {
        stokvel_id: quote.stokvel_id,
        previous_net_value: quote.current_fund_value,
        new_net_value,
        enrollment_id: quote.enrollment_id,
        payment: NewPayment {
            user_id: quote.user_id,
            stokvel_id: quote.stokvel_id,
            amount: -quote.withdrawal_amount,
        },
    })
}
