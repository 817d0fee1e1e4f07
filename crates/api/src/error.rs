//! JSON error responses.
//!
//! Every failure is rendered as `{"error": CODE, "message": text}`. Server
//! errors are logged and their details withheld from the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use stokvel_core::assistant::DirectoryError;
use stokvel_core::credentials::CredentialError;
use stokvel_core::stokvel::StokvelError;
use stokvel_db::repositories::{EnrollmentError, PaymentError, StokvelRepoError, UserError};
use stokvel_shared::AppError;
use tracing::error;
use validator::ValidationErrors;

/// An error ready to be returned from a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 404 for a missing resource.
    #[must_use]
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(what.to_string()).into()
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if err.is_client_facing() {
            err.to_string()
        } else {
            error!(error = %err, "Request failed");
            "An internal error occurred".to_string()
        };
        Self::new(status, err.error_code(), message)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err.to_string()).into()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        AppError::Database(err.to_string()).into()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err.to_string()).into()
    }
}

impl From<StokvelError> for ApiError {
    fn from(err: StokvelError) -> Self {
        let status = StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl From<StokvelRepoError> for ApiError {
    fn from(err: StokvelRepoError) -> Self {
        match err {
            StokvelRepoError::Rule(e) => e.into(),
            StokvelRepoError::Database(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(_) => AppError::Conflict(err.to_string()).into(),
            UserError::Credential(CredentialError::TooShort) => {
                AppError::Validation(CredentialError::TooShort.to_string()).into()
            }
            UserError::Credential(e) => AppError::Internal(e.to_string()).into(),
            UserError::Database(e) => e.into(),
        }
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::StokvelNotFound(_) | EnrollmentError::UserNotFound(_) => {
                AppError::NotFound(err.to_string()).into()
            }
            EnrollmentError::Rule(e) => e.into(),
            EnrollmentError::Database(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Rule(e) => e.into(),
            PaymentError::Database(e) => e.into(),
        }
    }
}
