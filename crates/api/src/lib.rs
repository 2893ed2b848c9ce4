//! HTTP surface of Postboard.
//!
//! Every route except `/health` requires a bearer token. Handlers build the
//! core services per request from [`AppState`] and render their errors
//! through [`error::error_response`].

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use postboard_core::storage::StorageService;
use postboard_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Blob storage for post attachments.
    pub storage: Arc<StorageService>,
}

/// Creates the main application router.
///
/// `max_body_bytes` caps every request body, multipart uploads included.
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
