//! Emergency withdrawal domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stokvel_shared::types::{EnrollmentId, PaymentId, StokvelId, UserId};

/// A withdrawal request: one member leaving one fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Member requesting the withdrawal.
    pub user_id: UserId,
    /// Fund the member is leaving.
    pub stokvel_id: StokvelId,
}

/// The member's enrollment, as read by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentRef {
    /// Enrollment row ID.
    pub id: EnrollmentId,
    /// Enrolled member.
    pub user_id: UserId,
    /// Fund enrolled in.
    pub stokvel_id: StokvelId,
}

/// A fund's current balance, as read by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundBalance {
    /// Fund ID.
    pub stokvel_id: StokvelId,
    /// Current net value in whole currency units.
    pub net_value: i64,
}

/// Result of validating a withdrawal (steps 1-6), without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalQuote {
    /// Member requesting the withdrawal.
    pub user_id: UserId,
    /// Fund being left.
    pub stokvel_id: StokvelId,
    /// Enrollment that will be removed.
    #[serde(skip)]
    pub enrollment_id: EnrollmentId,
    /// Signed sum of every payment by the member to the fund.
    pub total_contributions: Decimal,
    /// Penalty rate applied.
    pub penalty_rate: Decimal,
    /// Penalty withheld.
    pub penalty_amount: Decimal,
    /// Amount paid out to the member.
    pub withdrawal_amount: Decimal,
    /// Fund net value the quote was computed against.
    pub current_fund_value: i64,
}

/// Ledger entry appended by a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPayment {
    /// Member the entry belongs to.
    pub user_id: UserId,
    /// Fund the entry belongs to.
    pub stokvel_id: StokvelId,
    /// Signed amount (negative for a withdrawal).
    pub amount: Decimal,
}

/// Mutations that must be applied together, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalPlan {
    /// Fund whose balance is decremented.
    pub stokvel_id: StokvelId,
    /// Balance the plan was computed against; the commit is refused if it moved.
    pub previous_net_value: i64,
    /// Balance after the withdrawal.
    pub new_net_value: i64,
    /// Enrollment to delete.
    pub enrollment_id: EnrollmentId,
    /// Debit entry to append.
    pub payment: NewPayment,
}

/// Confirmation that a plan was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    /// ID of the appended debit entry.
    pub payment_id: PaymentId,
}

/// Outcome of a completed emergency withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalReceipt {
    /// Signed sum of payments before the withdrawal.
    pub total_contributions: Decimal,
    /// Penalty withheld.
    pub penalty_amount: Decimal,
    /// Amount paid out.
    pub withdrawal_amount: Decimal,
    /// Fund net value after the withdrawal.
    pub remaining_fund_value: i64,
    /// Ledger entry recording the debit.
    pub payment_id: PaymentId,
}
