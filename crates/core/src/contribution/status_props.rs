//! Property-based tests for payment status evaluation.

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone};
use proptest::prelude::*;

use super::status::{MonthWindow, PaymentStatus, evaluate_payment_status};

/// Offsets between UTC-12:00 and UTC+14:00 in quarter hours.
fn offset_strategy() -> impl Strategy<Value = FixedOffset> {
    (-48i32..=56).prop_map(|quarters| FixedOffset::east_opt(quarters * 900).unwrap())
}

/// Instants between 2000 and 2060.
fn instant_strategy() -> impl Strategy<Value = (FixedOffset, i64)> {
    (offset_strategy(), 946_684_800i64..2_840_140_800i64)
}

fn to_local(offset: FixedOffset, secs: i64) -> DateTime<FixedOffset> {
    offset.timestamp_opt(secs, 0).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A payment made at the evaluation instant is always current.
    #[test]
    fn prop_payment_at_now_is_current((offset, secs) in instant_strategy()) {
        let now = to_local(offset, secs);
        prop_assert_eq!(evaluate_payment_status(Some(&now), &now), PaymentStatus::Current);
    }

    /// Status agrees with a calendar comparison in the payment's offset.
    #[test]
    fn prop_status_matches_calendar_month(
        (offset, now_secs) in instant_strategy(),
        delta_days in -400i64..400,
        now_offset in offset_strategy(),
    ) {
        let paid_at = to_local(offset, now_secs) + Duration::days(delta_days);
        let now = to_local(now_offset, now_secs);

        let now_local = now.with_timezone(&offset);
        let same_month = paid_at.year() == now_local.year() && paid_at.month() == now_local.month();

        let status = evaluate_payment_status(Some(&paid_at), &now);
        prop_assert_eq!(status.is_current(), same_month);
    }

    /// Window boundaries: start is inside, end is outside, and they are one month apart.
    #[test]
    fn prop_window_is_half_open((offset, secs) in instant_strategy()) {
        let instant = to_local(offset, secs);
        let window = MonthWindow::containing(&instant);

        let start = offset.from_local_datetime(&window.start_local()).unwrap();
        let end = offset.from_local_datetime(&window.end_local()).unwrap();

        prop_assert!(window.contains(&start));
        prop_assert!(!window.contains(&end));
        prop_assert!(window.contains(&instant));
        prop_assert_eq!(start.day(), 1);
        prop_assert_eq!(end.day(), 1);
        prop_assert_eq!((end.month() + 12 - start.month()) % 12, 1);
    }
}
