//! Stokvel repository for fund definitions and membership listings.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use stokvel_core::stokvel::{NewStokvel, StokvelError};
use stokvel_shared::types::{PageRequest, StokvelId};
use tracing::info;
use uuid::Uuid;

use crate::entities::{stokvel_enrollments, stokvels, users};

/// Error types for stokvel operations.
#[derive(Debug, thiserror::Error)]
pub enum StokvelRepoError {
    /// Input broke a stokvel rule.
    #[error(transparent)]
    Rule(#[from] StokvelError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Stokvel repository.
#[derive(Debug, Clone)]
pub struct StokvelRepository {
    db: DatabaseConnection,
}

impl StokvelRepository {
    /// Creates a new stokvel repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and inserts a stokvel.
    ///
    /// # Errors
    ///
    /// Returns `Rule` if the definition is invalid.
    pub async fn create(&self, input: NewStokvel) -> Result<stokvels::Model, StokvelRepoError> {
        input.validate()?;

        let stokvel = stokvels::ActiveModel {
            id: Set(StokvelId::new().into_inner()),
            name: Set(input.name.trim().to_string()),
            number_people: Set(input.number_people),
            goal: Set(input.goal),
            monthly_contribution: Set(input.monthly_contribution),
            net_value: Set(input.net_value),
            interest_rate: Set(input.interest_rate),
            started_at: Set(input.started_at),
            end_at: Set(input.end_at),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(stokvel_id = %stokvel.id, name = %stokvel.name, "Stokvel created");
        Ok(stokvel)
    }

    /// Finds a stokvel by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<stokvels::Model>, DbErr> {
        stokvels::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists stokvels, oldest first, one page at a time.
    ///
    /// Returns the page and the total number of stokvels.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: PageRequest) -> Result<(Vec<stokvels::Model>, u64), DbErr> {
        let page = page.normalized();
        let paginator = stokvels::Entity::find()
            .order_by_asc(stokvels::Column::CreatedAt)
            .paginate(&self.db, u64::from(page.per_page));

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok((items, total))
    }

    /// Lists a stokvel's members with their enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn members(
        &self,
        stokvel_id: Uuid,
    ) -> Result<Vec<(stokvel_enrollments::Model, users::Model)>, DbErr> {
        stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id))
            .order_by_asc(stokvel_enrollments::Column::EnrolledAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|(enrollment, user)| user.map(|u| (enrollment, u)))
                    .collect()
            })
    }
}
