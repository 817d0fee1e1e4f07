//! Payment repository for the append-only contribution ledger.
//!
//! There is no update or delete. Negative rows are written only by the
//! withdrawal store.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use stokvel_core::contribution::ContributionEntry;
use stokvel_core::stokvel::{StokvelError, validate_contribution};
use stokvel_shared::types::PaymentId;
use tracing::info;
use uuid::Uuid;

use crate::entities::{payments, stokvel_enrollments};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Contribution broke a ledger rule.
    #[error(transparent)]
    Rule(#[from] StokvelError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Builds the active model for a ledger row, keeping the recording offset.
pub(crate) fn new_payment(
    user_id: Uuid,
    stokvel_id: Uuid,
    amount: Decimal,
    paid_at: DateTime<FixedOffset>,
) -> payments::ActiveModel {
    payments::ActiveModel {
        id: Set(PaymentId::new().into_inner()),
        user_id: Set(user_id),
        stokvel_id: Set(stokvel_id),
        amount: Set(amount),
        paid_at: Set(paid_at),
        paid_offset_seconds: Set(paid_at.offset().local_minus_utc()),
        created_at: Set(Utc::now().into()),
    }
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a contribution.
    ///
    /// Recording a contribution does not change the fund's net value.
    ///
    /// # Errors
    ///
    /// Returns `Rule` if the amount is not positive or the member is not
    /// enrolled.
    pub async fn record(
        &self,
        user_id: Uuid,
        stokvel_id: Uuid,
        amount: Decimal,
        paid_at: DateTime<FixedOffset>,
    ) -> Result<payments::Model, PaymentError> {
        let enrolled = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::UserId.eq(user_id))
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id))
            .count(&self.db)
            .await?
            > 0;

        validate_contribution(amount, enrolled)?;

        let payment = new_payment(user_id, stokvel_id, amount, paid_at)
            .insert(&self.db)
            .await?;

        info!(
            payment_id = %payment.id,
            user_id = %user_id,
            stokvel_id = %stokvel_id,
            amount = %amount,
            "Contribution recorded"
        );
        Ok(payment)
    }

    /// Finds a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Every ledger row for one member in one stokvel, as contribution entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn member_entries(
        &self,
        user_id: Uuid,
        stokvel_id: Uuid,
    ) -> Result<Vec<ContributionEntry>, DbErr> {
        let rows = payments::Entity::find()
            .filter(payments::Column::UserId.eq(user_id))
            .filter(payments::Column::StokvelId.eq(stokvel_id))
            .order_by_asc(payments::Column::PaidAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .iter()
            .map(|row| ContributionEntry {
                amount: row.amount,
                paid_at: row.paid_at_local(),
            })
            .collect())
    }
}
