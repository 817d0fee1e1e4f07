//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - JSON error mapping
//! - Request validation

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use stokvel_core::assistant::AssistantService;
use stokvel_core::withdrawal::WithdrawalService;
use stokvel_db::{DirectoryRepository, PgWithdrawalStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Emergency withdrawal engine; owns the per-fund lock table.
    pub withdrawals: WithdrawalService,
    /// Assistant query dispatcher.
    pub assistant: AssistantService,
    /// Zone used to stamp payments recorded without an explicit date.
    pub contribution_tz: Tz,
}

impl AppState {
    /// Creates state with a fresh withdrawal lock table.
    #[must_use]
    pub fn new(db: DatabaseConnection, contribution_tz: Tz) -> Self {
        let withdrawals = WithdrawalService::new();
        Self {
            db: Arc::new(db),
            assistant: AssistantService::new(withdrawals.clone()),
            withdrawals,
            contribution_tz,
        }
    }

    /// Withdrawal store over the shared pool.
    #[must_use]
    pub fn withdrawal_store(&self) -> PgWithdrawalStore {
        PgWithdrawalStore::new((*self.db).clone(), self.contribution_tz)
    }

    /// Read-only directory over the shared pool.
    #[must_use]
    pub fn directory(&self) -> DirectoryRepository {
        DirectoryRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
