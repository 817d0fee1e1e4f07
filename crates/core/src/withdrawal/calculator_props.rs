//! Property-based tests for withdrawal arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stokvel_shared::types::{EnrollmentId, StokvelId, UserId};

use super::calculator::{penalty_split, plan, quote};
use super::error::WithdrawalError;
use super::types::{EnrollmentRef, FundBalance};

/// Amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn refs(net_value: i64) -> (EnrollmentRef, FundBalance) {
    let stokvel_id = StokvelId::new();
    (
        EnrollmentRef {
            id: EnrollmentId::new(),
            user_id: UserId::new(),
            stokvel_id,
        },
        FundBalance {
            stokvel_id,
            net_value,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Penalty and payout always add back up to the total.
    #[test]
    fn prop_split_is_exact(total in positive_amount()) {
        let (penalty, payout) = penalty_split(total);
        prop_assert_eq!(penalty + payout, total);
        prop_assert!(payout < total);
        prop_assert!(penalty > Decimal::ZERO);
    }

    /// An accepted withdrawal never drives the fund negative and debits the
    /// truncated payout.
    #[test]
    fn prop_plan_keeps_fund_non_negative(
        total in positive_amount(),
        net_value in 0i64..2_000_000,
    ) {
        let (enrollment, fund) = refs(net_value);
        match quote(&enrollment, &fund, total) {
            Ok(q) => {
                let p = plan(&q).unwrap();
                prop_assert!(p.new_net_value >= 0);
                prop_assert_eq!(
                    Decimal::from(p.previous_net_value - p.new_net_value),
                    q.withdrawal_amount.trunc()
                );
                prop_assert_eq!(p.payment.amount, -q.withdrawal_amount);
            }
            Err(WithdrawalError::InsufficientFundLiquidity { available }) => {
                prop_assert_eq!(available, net_value);
                prop_assert!(Decimal::from(net_value) < penalty_split(total).1);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    /// Quoting is deterministic for identical inputs.
    #[test]
    fn prop_quote_is_deterministic(total in positive_amount()) {
        let (enrollment, fund) = refs(i64::MAX / 2);
        let first = quote(&enrollment, &fund, total).unwrap();
        let second = quote(&enrollment, &fund, total).unwrap();
        prop_assert_eq!(first, second);
    }
}
