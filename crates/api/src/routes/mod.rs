//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod assistant;
pub mod enrollments;
pub mod health;
pub mod payments;
pub mod stokvels;
pub mod users;
pub mod withdrawals;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(stokvels::routes())
        .merge(users::routes())
        .merge(enrollments::routes())
        .merge(payments::routes())
        .merge(withdrawals::routes())
        .merge(assistant::routes())
}
