//! Emergency withdrawal routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use stokvel_core::withdrawal::{
    WithdrawalError, WithdrawalQuote, WithdrawalReceipt, WithdrawalRequest, calculator,
};
use stokvel_shared::types::PaymentId;
use tracing::{error, info};

use crate::AppState;

/// Creates the withdrawal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/withdrawals/emergency", post(emergency_withdrawal))
        .route("/withdrawals/emergency/simulate", post(simulate_withdrawal))
}

/// A completed withdrawal.
#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    /// Member's net position before leaving.
    pub total_contributions: Decimal,
    /// Penalty withheld.
    pub penalty_amount: Decimal,
    /// Amount paid out.
    pub withdrawal_amount: Decimal,
    /// Fund balance after the payout.
    pub remaining_fund_value: i64,
    /// Ledger debit recording the payout.
    pub payment_id: PaymentId,
}

impl From<WithdrawalReceipt> for WithdrawalResponse {
    fn from(receipt: WithdrawalReceipt) -> Self {
        Self {
            total_contributions: receipt.total_contributions,
            penalty_amount: receipt.penalty_amount,
            withdrawal_amount: receipt.withdrawal_amount,
            remaining_fund_value: receipt.remaining_fund_value,
            payment_id: receipt.payment_id,
        }
    }
}

/// What a withdrawal would pay out right now.
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    /// Always `true`; nothing was changed.
    pub simulation: bool,
    /// Member's net position.
    pub total_contributions: Decimal,
    /// Penalty rate applied.
    pub penalty_rate: Decimal,
    /// Penalty that would be withheld.
    pub penalty_amount: Decimal,
    /// Amount that would be paid out.
    pub withdrawal_amount: Decimal,
    /// Fund balance now.
    pub current_fund_value: i64,
    /// Fund balance after the payout.
    pub remaining_fund_value: i64,
}

impl SimulationResponse {
    fn from_quote(quote: &WithdrawalQuote) -> Result<Self, WithdrawalError> {
        let plan = calculator::plan(quote)?;
        Ok(Self {
            simulation: true,
            total_contributions: quote.total_contributions,
            penalty_rate: quote.penalty_rate,
            penalty_amount: quote.penalty_amount,
            withdrawal_amount: quote.withdrawal_amount,
            current_fund_value: quote.current_fund_value,
            remaining_fund_value: plan.new_net_value,
        })
    }
}

/// A refused or failed withdrawal.
///
/// Rendered as `{"error": CODE, "reason": text, "available_amount"?: n}`.
#[derive(Debug)]
pub struct WithdrawalFailure(pub WithdrawalError);

impl From<WithdrawalError> for WithdrawalFailure {
    fn from(err: WithdrawalError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WithdrawalFailure {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let reason = if status.is_server_error() {
            error!(error = %err, "Emergency withdrawal failed");
            "The withdrawal could not be completed".to_string()
        } else {
            err.to_string()
        };

        let mut body = json!({
            "error": err.error_code(),
            "reason": reason,
        });
        if let Some(available) = err.available_amount() {
            body["available_amount"] = json!(available);
        }

        (status, Json(body)).into_response()
    }
}

/// POST `/withdrawals/emergency` - Leave a stokvel, paying out the net position less the penalty.
async fn emergency_withdrawal(
    State(state): State<AppState>,
    Json(req): Json<WithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, WithdrawalFailure> {
    let receipt = state
        .withdrawals
        .execute(&state.withdrawal_store(), req)
        .await?;

    info!(
        user_id = %req.user_id,
        stokvel_id = %req.stokvel_id,
        payment_id = %receipt.payment_id,
        "Emergency withdrawal served"
    );
    Ok(Json(receipt.into()))
}

/// POST `/withdrawals/emergency/simulate` - Quote a withdrawal without changing anything.
async fn simulate_withdrawal(
    State(state): State<AppState>,
    Json(req): Json<WithdrawalRequest>,
) -> Result<Json<SimulationResponse>, WithdrawalFailure> {
    let quote = state
        .withdrawals
        .simulate(&state.withdrawal_store(), req)
        .await?;

    Ok(Json(SimulationResponse::from_quote(&quote)?))
}
