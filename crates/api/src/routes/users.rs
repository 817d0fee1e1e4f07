//! Member registration and lookup routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use stokvel_core::assistant::{PAYMENT_HISTORY_LIMIT, PaymentFilter, PaymentRecord, StokvelDirectory};
use stokvel_core::contribution::evaluate_payment_status;
use stokvel_core::credentials::MIN_PASSWORD_LEN;
use stokvel_db::UserRepository;
use stokvel_db::entities::users;
use stokvel_db::repositories::CreateUserInput;
use stokvel_shared::types::UserId;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiError};

/// [`MIN_PASSWORD_LEN`] as the `u64` the `validator` length rule expects.
const MIN_PASSWORD_LEN_U64: u64 = MIN_PASSWORD_LEN as u64;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/stokvels", get(user_stokvels))
        .route("/users/{id}/payments", get(user_payments))
}

/// Request body for registering a member.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// First name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Surname.
    #[validate(length(min = 1, max = 100))]
    pub surname: String,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// National ID number.
    #[validate(length(min = 1, max = 32))]
    pub id_number: Option<String>,
    /// Plaintext password.
    #[validate(length(min = MIN_PASSWORD_LEN_U64))]
    pub password: String,
}

/// A registered member. The password hash is never returned.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Contact email.
    pub email: Option<String>,
    /// National ID number.
    pub id_number: Option<String>,
    /// Registration time.
    pub joined_at: DateTime<FixedOffset>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            id_number: user.id_number,
            joined_at: user.joined_at,
        }
    }
}

/// POST `/users` - Register a member.
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let user = UserRepository::new((*state.db).clone())
        .create(CreateUserInput {
            name: req.name,
            surname: req.surname,
            email: req.email,
            id_number: req.id_number,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn find_user(state: &AppState, id: Uuid) -> Result<users::Model, ApiError> {
    UserRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))
}

/// GET `/users/{id}` - Get a member.
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(find_user(&state, id).await?.into()))
}

/// GET `/users/{id}/stokvels` - Stokvels the member belongs to.
async fn user_stokvels(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    find_user(&state, id).await?;
    let memberships = state.directory().user_stokvels(UserId::from(id)).await?;
    Ok(Json(memberships))
}

/// GET `/users/{id}/payments` - The member's latest payments across stokvels.
async fn user_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    find_user(&state, id).await?;

    let filter = PaymentFilter {
        user_id: Some(UserId::from(id)),
        stokvel_id: None,
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
