//! Stokvel management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stokvel_core::assistant::{
    PAYMENT_HISTORY_LIMIT, PaymentFilter, PaymentRecord, StokvelDirectory, StokvelSummary,
};
use stokvel_core::contribution::{MemberStanding, evaluate_payment_status, member_standing};
use stokvel_core::stokvel::{NewStokvel, StokvelError};
use stokvel_db::repositories::directory::summary;
use stokvel_db::{EnrollmentRepository, PaymentRepository, StokvelRepository};
use stokvel_shared::types::{PageRequest, PageResponse, StokvelId, UserId};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{AppState, error::ApiError};

/// Creates the stokvel routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stokvels", get(list_stokvels).post(create_stokvel))
        .route("/stokvels/{id}", get(get_stokvel))
        .route("/stokvels/{id}/members", get(list_members))
        .route("/stokvels/{id}/members/{user_id}/status", get(member_status))
        .route("/stokvels/{id}/payments", get(list_payments))
        .route("/stokvels/{id}/statistics", get(statistics))
}

pub(super) fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Request body for creating a stokvel.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStokvelRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Target number of members.
    #[validate(range(min = 1))]
    pub number_people: i32,
    /// What the group is saving towards.
    #[validate(length(min = 1))]
    pub goal: String,
    /// Expected contribution per member per month.
    #[validate(custom(function = "positive"))]
    pub monthly_contribution: Decimal,
    /// Opening balance in whole currency units.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub net_value: i64,
    /// Interest rate as a percentage.
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub interest_rate: Decimal,
    /// Start of the savings cycle.
    pub started_at: DateTime<FixedOffset>,
    /// End of the savings cycle, if fixed.
    pub end_at: Option<DateTime<FixedOffset>>,
}

impl From<CreateStokvelRequest> for NewStokvel {
    fn from(req: CreateStokvelRequest) -> Self {
        Self {
            name: req.name,
            number_people: req.number_people,
            goal: req.goal,
            monthly_contribution: req.monthly_contribution,
            net_value: req.net_value,
            interest_rate: req.interest_rate,
            started_at: req.started_at,
            end_at: req.end_at,
        }
    }
}

/// A member's compliance with the monthly contribution.
#[derive(Debug, Serialize)]
pub struct MemberStatusResponse {
    /// Member.
    pub user_id: UserId,
    /// Stokvel.
    pub stokvel_id: StokvelId,
    /// Derived standing for the current month.
    #[serde(flatten)]
    pub standing: MemberStanding,
}

/// POST `/stokvels` - Create a stokvel.
async fn create_stokvel(
    State(state): State<AppState>,
    Json(req): Json<CreateStokvelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let stokvel = StokvelRepository::new((*state.db).clone())
        .create(req.into())
        .await?;

    info!(stokvel_id = %stokvel.id, "Stokvel created via API");
    Ok((StatusCode::CREATED, Json(summary(stokvel))))
}

/// GET `/stokvels` - List stokvels, oldest first.
async fn list_stokvels(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<StokvelSummary>>, ApiError> {
    let page = page.normalized();
    let (rows, total) = StokvelRepository::new((*state.db).clone())
        .list(page.clone())
        .await?;

    Ok(Json(PageResponse::new(
        rows.into_iter().map(summary).collect(),
        page.page,
        page.per_page,
        total,
    )))
}

/// GET `/stokvels/{id}` - Stokvel with enrollment and payment counts.
async fn get_stokvel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .directory()
        .get_stokvel(StokvelId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found("stokvel"))?;

    Ok(Json(detail))
}

async fn ensure_stokvel(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    StokvelRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("stokvel"))
}

/// GET `/stokvels/{id}/members` - Enrolled members, earliest first.
async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_stokvel(&state, id).await?;
    let members = state.directory().stokvel_members(StokvelId::from(id)).await?;
    Ok(Json(members))
}

/// GET `/stokvels/{id}/payments` - Latest payments with derived status.
async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_stokvel(&state, id).await?;

    let filter = PaymentFilter {
        user_id: None,
        stokvel_id: Some(StokvelId::from(id)),
    };
    let now = Utc::now();
    let records: Vec<PaymentRecord> = state
        .directory()
        .payment_history(filter, PAYMENT_HISTORY_LIMIT)
        .await?
        .into_iter()
        .map(|row| {
            let status = evaluate_payment_status(Some(&row.paid_at), &now);
            PaymentRecord::from_row(row, status)
        })
        .collect();

    Ok(Json(records))
}

/// GET `/stokvels/{id}/statistics` - Membership and payment aggregates.
async fn statistics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .directory()
        .stokvel_statistics(StokvelId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found("stokvel"))?;

    Ok(Json(report))
}

/// GET `/stokvels/{id}/members/{user_id}/status` - Whether a member has paid this month.
async fn member_status(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_stokvel(&state, id).await?;

    if EnrollmentRepository::new((*state.db).clone())
        .find(user_id, id)
        .await?
        .is_none()
    {
        return Err(StokvelError::NotEnrolled.into());
    }

    let entries = PaymentRepository::new((*state.db).clone())
        .member_entries(user_id, id)
        .await?;

    Ok(Json(MemberStatusResponse {
        user_id: UserId::from(user_id),
        stokvel_id: StokvelId::from(id),
        standing: member_standing(&entries, &Utc::now()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{json_request, test_app};
    use serde_json::json;
    use tower::ServiceExt;

    fn valid_body() -> serde_json::Value {
        json!({
            "name": "Burial Society",
            "number_people": 10,
            "goal": "Funeral cover",
            "monthly_contribution": "250",
            "started_at": "2025-01-01T00:00:00+02:00"
        })
    }

    #[test]
    fn test_valid_request_passes_validation() {
        let req: CreateStokvelRequest = serde_json::from_value(valid_body()).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.net_value, 0);
        assert_eq!(req.interest_rate, Decimal::ZERO);
    }

    #[test]
    fn test_zero_contribution_fails_validation() {
        let mut body = valid_body();
        body["monthly_contribution"] = json!("0");
        let req: CreateStokvelRequest = serde_json::from_value(body).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("monthly_contribution"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name_before_database() {
        let mut body = valid_body();
        body["name"] = json!("");

        let response = test_app()
            .oneshot(json_request("POST", "/api/v1/stokvels", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_opening_balance() {
        let mut body = valid_body();
        body["net_value"] = json!(-1);

        let response = test_app()
            .oneshot(json_request("POST", "/api/v1/stokvels", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
