//! Emergency withdrawal error types.
//!
//! Validation failures are deterministic and leave no trace; a
//! `Persistence` failure means the atomic commit did not happen and the
//! caller must not retry blindly.

use stokvel_shared::types::{EnrollmentId, StokvelId, UserId};
use thiserror::Error;

/// Failures reported by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The fund balance changed between the quote and the commit.
    #[error("fund {stokvel_id} balance changed: expected {expected}, found {actual}")]
    StaleBalance {
        /// Fund whose balance moved.
        stokvel_id: StokvelId,
        /// Balance the plan was computed against.
        expected: i64,
        /// Balance found at commit time.
        actual: i64,
    },

    /// The enrollment to remove no longer exists.
    #[error("enrollment {0} no longer exists")]
    EnrollmentMissing(EnrollmentId),

    /// The fund row disappeared before the commit.
    #[error("fund {0} no longer exists")]
    FundMissing(StokvelId),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),
}

/// Errors that can occur while quoting or executing an emergency withdrawal.
#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// The member has no enrollment in the fund.
    #[error("user {user_id} is not enrolled in stokvel {stokvel_id}")]
    NotEnrolled {
        /// Member that requested the withdrawal.
        user_id: UserId,
        /// Fund the withdrawal targets.
        stokvel_id: StokvelId,
    },

    /// The fund does not exist.
    #[error("stokvel not found: {0}")]
    FundNotFound(StokvelId),

    /// The member's net position in the fund is zero or negative.
    #[error("no contributions found for this member in this stokvel")]
    NoContributions,

    /// The fund cannot cover the withdrawal amount.
    #[error("insufficient funds in stokvel: {available} available")]
    InsufficientFundLiquidity {
        /// Current fund net value.
        available: i64,
    },

    /// Reading or committing through the store failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// Arithmetic produced a value outside the representable range.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WithdrawalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotEnrolled { .. } => "NOT_ENROLLED",
            Self::FundNotFound(_) => "FUND_NOT_FOUND",
            Self::NoContributions => "NO_CONTRIBUTIONS",
            Self::InsufficientFundLiquidity { .. } => "INSUFFICIENT_FUND_LIQUIDITY",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::FundNotFound(_) => 404,
            Self::NotEnrolled { .. }
            | Self::NoContributions
            | Self::InsufficientFundLiquidity { .. } => 422,
            Self::Persistence(StoreError::StaleBalance { .. } | StoreError::EnrollmentMissing(_)) => {
                409
            }
            Self::Persistence(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the available fund amount for liquidity failures.
    #[must_use]
    pub const fn available_amount(&self) -> Option<i64> {
        match self {
            Self::InsufficientFundLiquidity { available } => Some(*available),
            _ => None,
        }
    }

    /// Withdrawals are never retried automatically.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(WithdrawalError::NoContributions.error_code(), "NO_CONTRIBUTIONS");
        assert_eq!(
            WithdrawalError::FundNotFound(StokvelId::new()).error_code(),
            "FUND_NOT_FOUND"
        );
        assert_eq!(
            WithdrawalError::InsufficientFundLiquidity { available: 500 }.error_code(),
            "INSUFFICIENT_FUND_LIQUIDITY"
        );
        assert_eq!(
            WithdrawalError::Persistence(StoreError::Database("boom".into())).error_code(),
            "PERSISTENCE_ERROR"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            WithdrawalError::NotEnrolled {
                user_id: UserId::new(),
                stokvel_id: StokvelId::new(),
            }
            .http_status_code(),
            422
        );
        assert_eq!(WithdrawalError::FundNotFound(StokvelId::new()).http_status_code(), 404);
        assert_eq!(
            WithdrawalError::Persistence(StoreError::EnrollmentMissing(EnrollmentId::new()))
                .http_status_code(),
            409
        );
        assert_eq!(
            WithdrawalError::Persistence(StoreError::Database("x".into())).http_status_code(),
            500
        );
    }

    #[test]
    fn test_available_amount_and_display() {
        let err = WithdrawalError::InsufficientFundLiquidity { available: 500 };
        assert_eq!(err.available_amount(), Some(500));
        assert_eq!(err.to_string(), "insufficient funds in stokvel: 500 available");
        assert_eq!(WithdrawalError::NoContributions.available_amount(), None);
    }

    #[test]
    fn test_nothing_is_retryable() {
        assert!(!WithdrawalError::Persistence(StoreError::Database("x".into())).is_retryable());
        assert!(!WithdrawalError::NoContributions.is_retryable());
    }
}
