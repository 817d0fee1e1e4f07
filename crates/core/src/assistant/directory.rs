//! Read-only lookups behind the assistant's queries.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use stokvel_shared::types::{PaymentId, StokvelId, UserId};
use thiserror::Error;

use crate::contribution::PaymentStatus;
use crate::stokvel::StokvelStatistics;

/// A lookup failed in the backing store.
#[derive(Debug, Error)]
#[error("directory lookup failed: {0}")]
pub struct DirectoryError(pub String);

/// A stokvel as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StokvelSummary {
    /// Stokvel ID.
    pub id: StokvelId,
    /// Display name.
    pub name: String,
    /// Target group size.
    pub number_people: i32,
    /// Saving goal.
    pub goal: String,
    /// Expected monthly contribution.
    pub monthly_contribution: Decimal,
    /// Current fund value.
    pub net_value: i64,
    /// Interest rate percentage.
    pub interest_rate: Decimal,
    /// Start of the stokvel.
    pub started_at: DateTime<FixedOffset>,
    /// Optional end.
    pub end_at: Option<DateTime<FixedOffset>>,
}

/// A stokvel with its activity counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StokvelDetail {
    /// Definition and balance.
    #[serde(flatten)]
    pub stokvel: StokvelSummary,
    /// Enrolled members.
    pub current_enrollments: u64,
    /// Ledger rows recorded.
    pub total_payments_made: u64,
}

/// An enrolled member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSummary {
    /// Member ID.
    pub user_id: UserId,
    /// First name and surname.
    pub name: String,
    /// Contact email, if known.
    pub email: Option<String>,
    /// Whether the member organises the stokvel.
    pub is_admin: bool,
    /// When the member joined this stokvel.
    pub enrolled_at: DateTime<FixedOffset>,
}

/// A stokvel seen from one member's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStokvel {
    /// Stokvel ID.
    pub stokvel_id: StokvelId,
    /// Stokvel name.
    pub stokvel_name: String,
    /// Expected monthly contribution.
    pub monthly_contribution: Decimal,
    /// Current fund value.
    pub net_value: i64,
    /// Whether the member organises the stokvel.
    pub is_admin: bool,
    /// When the member joined.
    pub enrolled_at: DateTime<FixedOffset>,
}

/// Filter for payment history lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    /// Restrict to one member.
    pub user_id: Option<UserId>,
    /// Restrict to one stokvel.
    pub stokvel_id: Option<StokvelId>,
}

/// A ledger row joined with member and stokvel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRow {
    /// Payment ID.
    pub payment_id: PaymentId,
    /// Payer.
    pub user_id: UserId,
    /// Payer's full name.
    pub user_name: String,
    /// Stokvel paid into.
    pub stokvel_id: StokvelId,
    /// Stokvel name.
    pub stokvel_name: String,
    /// Signed amount.
    pub amount: Decimal,
    /// When it was paid, in the offset it was recorded in.
    pub paid_at: DateTime<FixedOffset>,
}

/// A ledger row with its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRecord {
    /// Payment ID.
    pub payment_id: PaymentId,
    /// Payer.
    pub user_id: UserId,
    /// Payer's full name.
    pub user_name: String,
    /// Stokvel paid into.
    pub stokvel_id: StokvelId,
    /// Stokvel name.
    pub stokvel_name: String,
    /// Signed amount.
    pub amount: Decimal,
    /// When it was paid.
    pub paid_at: DateTime<FixedOffset>,
    /// 1 when paid in the current calendar month.
    pub status: PaymentStatus,
}

impl PaymentRecord {
    /// Attaches a status to a row.
    #[must_use]
    pub fn from_row(row: PaymentRow, status: PaymentStatus) -> Self {
        Self {
            payment_id: row.payment_id,
            user_id: row.user_id,
            user_name: row.user_name,
            stokvel_id: row.stokvel_id,
            stokvel_name: row.stokvel_name,
            amount: row.amount,
            paid_at: row.paid_at,
            status,
        }
    }
}

/// Statistics together with the stokvel's descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsReport {
    /// Stokvel name.
    pub stokvel_name: String,
    /// Saving goal.
    pub goal: String,
    /// Expected monthly contribution.
    pub target_monthly_contribution: Decimal,
    /// Interest rate percentage.
    pub interest_rate: Decimal,
    /// Computed totals.
    #[serde(flatten)]
    pub statistics: StokvelStatistics,
}

/// A name search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Stokvel ID.
    pub id: StokvelId,
    /// Display name.
    pub name: String,
    /// Saving goal.
    pub goal: String,
    /// Expected monthly contribution.
    pub monthly_contribution: Decimal,
    /// Current fund value.
    pub net_value: i64,
    /// Enrolled members.
    pub member_count: u64,
}

/// Read-only access to stokvels, members and payments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StokvelDirectory: Send + Sync {
    /// Every stokvel.
    async fn list_stokvels(&self) -> Result<Vec<StokvelSummary>, DirectoryError>;

    /// One stokvel with activity counts.
    async fn get_stokvel(&self, stokvel_id: StokvelId)
    -> Result<Option<StokvelDetail>, DirectoryError>;

    /// Members of a stokvel.
    async fn stokvel_members(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Vec<MemberSummary>, DirectoryError>;

    /// Stokvels a member belongs to.
    async fn user_stokvels(&self, user_id: UserId) -> Result<Vec<UserStokvel>, DirectoryError>;

    /// Latest payments matching the filter, newest first, at most `limit`.
    async fn payment_history(
        &self,
        filter: PaymentFilter,
        limit: u64,
    ) -> Result<Vec<PaymentRow>, DirectoryError>;

    /// Statistics for a stokvel, `None` if it does not exist.
    async fn stokvel_statistics(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Option<StatisticsReport>, DirectoryError>;

    /// Stokvels whose name contains `term`, ignoring case.
    async fn search_stokvels(&self, term: &str) -> Result<Vec<SearchHit>, DirectoryError>;
}
