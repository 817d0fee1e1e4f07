//! Aggregate figures for a single stokvel.

use rust_decimal::Decimal;
use serde::Serialize;

/// Membership and ledger totals for a stokvel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StokvelStatistics {
    /// Enrolled members, admins included.
    pub member_count: u64,
    /// Enrolled members with the admin role.
    pub admin_count: u64,
    /// Ledger rows, withdrawals included.
    pub payment_count: u64,
    /// Signed sum of every ledger row.
    pub total_payments: Decimal,
    /// Mean ledger amount, zero when there are no payments.
    pub average_payment: Decimal,
    /// Current fund value.
    pub net_value: i64,
}

impl StokvelStatistics {
    /// Builds statistics from membership counts and ledger aggregates.
    ///
    /// `total_payments` is the signed sum of `payment_count` ledger rows.
    #[must_use]
    pub fn from_totals(
        member_count: u64,
        admin_count: u64,
        net_value: i64,
        payment_count: u64,
        total_payments: Decimal,
    ) -> Self {
        let average_payment = if payment_count == 0 {
            Decimal::ZERO
        } else {
            (total_payments / Decimal::from(payment_count)).round_dp(2)
        };

        Self {
            member_count,
            admin_count,
            payment_count,
            total_payments,
            average_payment,
            net_value,
        }
    }
}
