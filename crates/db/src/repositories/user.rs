//! User repository for member registration and lookups.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use stokvel_core::credentials::{CredentialError, hash_password};
use stokvel_shared::types::UserId;
use tracing::info;
use uuid::Uuid;

use crate::entities::{stokvel_enrollments, stokvels, users};

/// Input for registering a member.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Optional contact email, unique when present.
    pub email: Option<String>,
    /// Optional national ID number.
    pub id_number: Option<String>,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email already registered.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// Password rejected or hashing failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Registers a member, storing an Argon2id hash of the password.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken, or `Credential` if the
    /// password is too short.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let email = input
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        if let Some(email) = &email
            && self.email_exists(email).await?
        {
            return Err(UserError::DuplicateEmail(email.clone()));
        }

        let password_hash = hash_password(&input.password)?;

        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            name: Set(input.name.trim().to_string()),
            surname: Set(input.surname.trim().to_string()),
            email: Set(email),
            id_number: Set(input.id_number),
            password_hash: Set(password_hash),
            joined_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Gets all stokvels a user is enrolled in, with the enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stokvels(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(stokvels::Model, stokvel_enrollments::Model)>, DbErr> {
        stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::UserId.eq(user_id))
            .order_by_asc(stokvel_enrollments::Column::EnrolledAt)
            .find_also_related(stokvels::Entity)
            .all(&self.db)
            .await
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|(enrollment, stokvel)| stokvel.map(|s| (s, enrollment)))
                    .collect()
            })
    }
}
