//! Stokvel rule violations.

use thiserror::Error;

/// Errors raised when stokvel, enrollment or payment input breaks a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StokvelError {
    /// Name is empty or whitespace.
    #[error("stokvel name cannot be empty")]
    EmptyName,

    /// Target group size must be at least one member.
    #[error("number of people must be at least 1")]
    InvalidGroupSize,

    /// Monthly contribution target must be positive.
    #[error("monthly contribution must be greater than zero")]
    InvalidMonthlyContribution,

    /// Net value cannot start negative.
    #[error("net value cannot be negative")]
    NegativeNetValue,

    /// Interest rate cannot be negative.
    #[error("interest rate cannot be negative")]
    NegativeInterestRate,

    /// End date is on or before the start date.
    #[error("end date must be after start date")]
    EndBeforeStart,

    /// Member already belongs to the stokvel.
    #[error("user is already enrolled in this stokvel")]
    AlreadyEnrolled,

    /// Stokvel has reached its target size.
    #[error("stokvel is full ({capacity} members)")]
    StokvelFull {
        /// Target group size.
        capacity: i32,
    },

    /// Member must be enrolled to contribute.
    #[error("user is not enrolled in this stokvel")]
    NotEnrolled,

    /// Contributions must be positive; debits come only from withdrawals.
    #[error("contribution amount must be greater than zero")]
    NonPositiveContribution,
}

impl StokvelError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_NAME",
            Self::InvalidGroupSize => "INVALID_GROUP_SIZE",
            Self::InvalidMonthlyContribution => "INVALID_MONTHLY_CONTRIBUTION",
            Self::NegativeNetValue => "NEGATIVE_NET_VALUE",
            Self::NegativeInterestRate => "NEGATIVE_INTEREST_RATE",
            Self::EndBeforeStart => "END_BEFORE_START",
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::StokvelFull { .. } => "STOKVEL_FULL",
            Self::NotEnrolled => "NOT_ENROLLED",
            Self::NonPositiveContribution => "NON_POSITIVE_CONTRIBUTION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyEnrolled => 409,
            Self::StokvelFull { .. } | Self::NotEnrolled => 422,
            _ => 400,
        }
    }
}
