//! Enrollment routes.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use stokvel_db::EnrollmentRepository;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Creates the enrollment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/enrollments", post(enroll))
}

/// Request body for joining a stokvel.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Joining member.
    pub user_id: Uuid,
    /// Stokvel to join.
    pub stokvel_id: Uuid,
    /// Whether the member administers the stokvel.
    #[serde(default)]
    pub is_admin: bool,
}

/// A created enrollment.
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    /// Enrollment ID.
    pub id: Uuid,
    /// Enrolled member.
    pub user_id: Uuid,
    /// Stokvel joined.
    pub stokvel_id: Uuid,
    /// Administrator flag.
    pub is_admin: bool,
    /// When the member joined.
    pub enrolled_at: DateTime<FixedOffset>,
}

/// POST `/enrollments` - Enroll a member, refusing duplicates and full stokvels.
async fn enroll(
    State(state): State<AppState>,
    Json(req): Json<EnrollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = EnrollmentRepository::new((*state.db).clone())
        .enroll(req.user_id, req.stokvel_id, req.is_admin)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            id: enrollment.id,
            user_id: enrollment.user_id,
            stokvel_id: enrollment.stokvel_id,
            is_admin: enrollment.is_admin,
            enrolled_at: enrollment.enrolled_at,
        }),
    ))
}
