//! HTTP API layer with Axum routes.
//!
//! This crate exposes the collaborator-facing surface of the ledger:
//! cashbox provisioning and reads, the three write operations (income,
//! expense, reversal), and the derived reports. It holds no business
//! logic; every balance decision is made by the ledger service.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use registra_db::Ledger;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// The ledger service: the only writer of cashbox balances.
    pub ledger: Arc<Ledger>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
