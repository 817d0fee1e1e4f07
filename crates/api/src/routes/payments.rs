//! Contribution routes.
//!
//! Every payment response carries a `status` derived at read time.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stokvel_core::contribution::{PaymentStatus, evaluate_payment_status, recorded_at};
use stokvel_db::PaymentRepository;
use stokvel_db::entities::payments;
use uuid::Uuid;
use validator::Validate;

use super::stokvels::positive;
use crate::{AppState, error::ApiError};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(record_payment))
        .route("/payments/{id}", get(get_payment))
}

/// Request body for recording a contribution.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    /// Paying member.
    pub user_id: Uuid,
    /// Stokvel paid into.
    pub stokvel_id: Uuid,
    /// Amount paid; must be positive.
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    /// When the payment was made. Defaults to now in the bookkeeping zone.
    pub paid_at: Option<DateTime<FixedOffset>>,
}

/// A ledger row with its derived status.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Member.
    pub user_id: Uuid,
    /// Stokvel.
    pub stokvel_id: Uuid,
    /// Signed amount; negative rows are withdrawal debits.
    pub amount: Decimal,
    /// Payment time in the offset it was recorded in.
    pub paid_at: DateTime<FixedOffset>,
    /// `1` if the payment falls in the current month, else `0`.
    pub status: PaymentStatus,
}

impl PaymentResponse {
    fn at(model: &payments::Model, now: &DateTime<Utc>) -> Self {
        let paid_at = model.paid_at_local();
        Self {
            id: model.id,
            user_id: model.user_id,
            stokvel_id: model.stokvel_id,
            amount: model.amount,
            status: evaluate_payment_status(Some(&paid_at), now),
            paid_at,
        }
    }
}

/// POST `/payments` - Record a contribution. The fund's net value is unchanged.
async fn record_payment(
    State(state): State<AppState>,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let now = Utc::now();
    let paid_at = req
        .paid_at
        .unwrap_or_else(|| recorded_at(now, state.contribution_tz));

    let payment = PaymentRepository::new((*state.db).clone())
        .record(req.user_id, req.stokvel_id, req.amount, paid_at)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::at(&payment, &now))))
}

/// GET `/payments/{id}` - Get a payment.
async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = PaymentRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("payment"))?;

    Ok(Json(PaymentResponse::at(&payment, &Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, json_request, test_app};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use rstest::rstest;
    use serde_json::json;
    use tower::ServiceExt;

    fn model(amount: Decimal, paid_at: DateTime<FixedOffset>) -> payments::Model {
        payments::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            stokvel_id: Uuid::now_v7(),
            amount,
            paid_at,
            paid_offset_seconds: paid_at.offset().local_minus_utc(),
            created_at: paid_at,
        }
    }

    #[test]
    fn test_status_uses_recorded_offset() {
        // 00:30 on 1 June in SAST is still 31 May in UTC.
        let sast = FixedOffset::east_opt(2 * 3600).unwrap();
        let paid_at = sast.with_ymd_and_hms(2025, 6, 1, 0, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        let response = PaymentResponse::at(&model(dec!(500), paid_at), &now);

        assert_eq!(response.status, PaymentStatus::Current);
        assert_eq!(response.paid_at, paid_at);
    }

    #[test]
    fn test_serialized_status_is_integer() {
        let sast = FixedOffset::east_opt(2 * 3600).unwrap();
        let paid_at = sast.with_ymd_and_hms(2025, 4, 10, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        let json = serde_json::to_value(PaymentResponse::at(&model(dec!(250), paid_at), &now)).unwrap();

        assert_eq!(json["status"], 0);
        assert_eq!(json["amount"], "250");
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-250")]
    #[tokio::test]
    async fn test_non_positive_amount_rejected_before_storage(#[case] amount: &str) {
        let body = json!({
            "user_id": Uuid::now_v7(),
            "stokvel_id": Uuid::now_v7(),
            "amount": amount,
        });

        let response = test_app()
            .oneshot(json_request("POST", "/api/v1/payments", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
