//! Enrollment repository for joining members to stokvels.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use stokvel_core::stokvel::{StokvelError, check_enrollment};
use stokvel_shared::types::EnrollmentId;
use tracing::info;
use uuid::Uuid;

use crate::entities::{stokvel_enrollments, stokvels, users};

/// Error types for enrollment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    /// Stokvel not found.
    #[error("Stokvel not found: {0}")]
    StokvelNotFound(Uuid),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Enrollment broke a membership rule.
    #[error(transparent)]
    Rule(#[from] StokvelError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Enrollment repository.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    db: DatabaseConnection,
}

impl EnrollmentRepository {
    /// Creates a new enrollment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enrolls a member in a stokvel.
    ///
    /// The stokvel row is locked for the duration of the check so two joins
    /// cannot both take the last seat.
    ///
    /// # Errors
    ///
    /// Returns `Rule(AlreadyEnrolled)` or `Rule(StokvelFull)` when the join is
    /// refused.
    pub async fn enroll(
        &self,
        user_id: Uuid,
        stokvel_id: Uuid,
        is_admin: bool,
    ) -> Result<stokvel_enrollments::Model, EnrollmentError> {
        let txn = self.db.begin().await?;

        let stokvel = stokvels::Entity::find_by_id(stokvel_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(EnrollmentError::StokvelNotFound(stokvel_id))?;

        users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(EnrollmentError::UserNotFound(user_id))?;

        let current_members = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id))
            .count(&txn)
            .await?;

        let already_enrolled = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id))
            .filter(stokvel_enrollments::Column::UserId.eq(user_id))
            .count(&txn)
            .await?
            > 0;

        check_enrollment(stokvel.number_people, current_members, already_enrolled)?;

        let enrollment = stokvel_enrollments::ActiveModel {
            id: Set(EnrollmentId::new().into_inner()),
            user_id: Set(user_id),
            stokvel_id: Set(stokvel_id),
            is_admin: Set(is_admin),
            enrolled_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            user_id = %user_id,
            stokvel_id = %stokvel_id,
            is_admin,
            "Member enrolled"
        );
        Ok(enrollment)
    }

    /// Finds a member's enrollment in a stokvel.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        user_id: Uuid,
        stokvel_id: Uuid,
    ) -> Result<Option<stokvel_enrollments::Model>, DbErr> {
        stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::UserId.eq(user_id))
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id))
            .one(&self.db)
            .await
    }
}
