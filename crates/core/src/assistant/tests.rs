//! Assistant dispatch tests.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rust_decimal_macros::dec;
use stokvel_shared::types::{EnrollmentId, PaymentId, StokvelId, UserId};

use super::directory::MockStokvelDirectory;
use super::*;
use crate::contribution::PaymentStatus;
use crate::withdrawal::store::MockWithdrawalStore;
use crate::withdrawal::{EnrollmentRef, FundBalance, StoreError};

fn sast(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, 12, 0, 0)
        .unwrap()
}

fn row(amount: rust_decimal::Decimal, paid_at: DateTime<FixedOffset>) -> PaymentRow {
    PaymentRow {
        payment_id: PaymentId::new(),
        user_id: UserId::new(),
        user_name: "John Doe".to_string(),
        stokvel_id: StokvelId::new(),
        stokvel_name: "Emergency Test Stokvel".to_string(),
        amount,
        paid_at,
    }
}

fn idle_store() -> MockWithdrawalStore {
    let mut store = MockWithdrawalStore::new();
    store.expect_begin_withdrawal().never();
    store
}

#[tokio::test]
async fn test_payment_history_derives_status() {
    let mut directory = MockStokvelDirectory::new();
    directory
        .expect_payment_history()
        .withf(|filter, limit| filter.user_id.is_none() && *limit == PAYMENT_HISTORY_LIMIT)
        .returning(|_, _| Ok(vec![row(dec!(300), sast(2025, 6, 20)), row(dec!(500), sast(2025, 5, 31))]));

    let now = Utc.with_ymd_and_hms(2025, 6, 25, 8, 0, 0).unwrap();
    let answer = AssistantService::default()
        .answer_at(
            AssistantQuery::PaymentHistory {
                user_id: None,
                stokvel_id: None,
            },
            &directory,
            &idle_store(),
            now,
        )
        .await
        .unwrap();

    let AssistantAnswer::Payments(records) = answer else {
        panic!("expected payments, got {answer:?}");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, PaymentStatus::Current);
    assert_eq!(records[1].status, PaymentStatus::NotCurrent);
}

#[tokio::test]
async fn test_simulation_returns_quote_without_committing() {
    let user_id = UserId::new();
    let stokvel_id = StokvelId::new();

    let mut store = idle_store();
    store.expect_find_enrollment().returning(move |_, _| {
        Ok(Some(EnrollmentRef {
            id: EnrollmentId::new(),
            user_id,
            stokvel_id,
        }))
    });
    store.expect_find_fund().returning(move |_| {
        Ok(Some(FundBalance {
            stokvel_id,
            net_value: 5000,
        }))
    });
    store
        .expect_sum_payments()
        .returning(|_, _| Ok(dec!(1550)));

    let answer = AssistantService::default()
        .answer(
            AssistantQuery::SimulateEmergencyWithdrawal {
                user_id,
                stokvel_id,
            },
            &MockStokvelDirectory::new(),
            &store,
        )
        .await
        .unwrap();

    let AssistantAnswer::WithdrawalSimulation(quote) = answer else {
        panic!("expected a simulation, got {answer:?}");
    };
    assert_eq!(quote.penalty_amount, dec!(155.0));
    assert_eq!(quote.withdrawal_amount, dec!(1395.0));
    assert_eq!(quote.current_fund_value, 5000);
}

#[tokio::test]
async fn test_simulation_failure_is_reported_not_invented() {
    let user_id = UserId::new();
    let stokvel_id = StokvelId::new();

    let mut store = idle_store();
    store.expect_find_enrollment().returning(move |_, _| {
        Ok(Some(EnrollmentRef {
            id: EnrollmentId::new(),
            user_id,
            stokvel_id,
        }))
    });
    store.expect_find_fund().returning(move |_| {
        Ok(Some(FundBalance {
            stokvel_id,
            net_value: 500,
        }))
    });
    store
        .expect_sum_payments()
        .returning(|_, _| Ok(dec!(1000)));

    let answer = AssistantService::default()
        .answer(
            AssistantQuery::SimulateEmergencyWithdrawal {
                user_id,
                stokvel_id,
            },
            &MockStokvelDirectory::new(),
            &store,
        )
        .await
        .unwrap();

    assert_eq!(
        answer,
        AssistantAnswer::WithdrawalUnavailable {
            reason: "insufficient funds in stokvel: 500 available".to_string(),
            code: "INSUFFICIENT_FUND_LIQUIDITY".to_string(),
            available_amount: Some(500),
        }
    );
}

#[tokio::test]
async fn test_simulation_store_failure_is_unavailable() {
    let mut store = idle_store();
    store
        .expect_find_enrollment()
        .returning(|_, _| Err(StoreError::Database("connection reset".to_string())));

    let answer = AssistantService::default()
        .answer(
            AssistantQuery::SimulateEmergencyWithdrawal {
                user_id: UserId::new(),
                stokvel_id: StokvelId::new(),
            },
            &MockStokvelDirectory::new(),
            &store,
        )
        .await
        .unwrap();

    match answer {
        AssistantAnswer::WithdrawalUnavailable { code, .. } => {
            assert_eq!(code, "PERSISTENCE_ERROR");
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_trims_term() {
    let mut directory = MockStokvelDirectory::new();
    directory
        .expect_search_stokvels()
        .returning(|term| {
            assert_eq!(term, "burial");
            Ok(vec![])
        });

    let answer = AssistantService::default()
        .answer(
            AssistantQuery::SearchStokvels {
                term: "  burial ".to_string(),
            },
            &directory,
            &idle_store(),
        )
        .await
        .unwrap();

    assert_eq!(answer, AssistantAnswer::SearchResults(vec![]));
}

#[tokio::test]
async fn test_directory_failure_propagates() {
    let mut directory = MockStokvelDirectory::new();
    directory
        .expect_list_stokvels()
        .returning(|| Err(DirectoryError("pool timed out".to_string())));

    let result = AssistantService::default()
        .answer(AssistantQuery::ListStokvels, &directory, &idle_store())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_unknown_stokvel_is_none() {
    let mut directory = MockStokvelDirectory::new();
    directory.expect_get_stokvel().returning(|_| Ok(None));

    let answer = AssistantService::default()
        .answer(
            AssistantQuery::GetStokvel {
                stokvel_id: StokvelId::new(),
            },
            &directory,
            &idle_store(),
        )
        .await
        .unwrap();

    assert_eq!(answer, AssistantAnswer::Stokvel(None));
}
