pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod sql;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use db::AppState;

/// Assemble the router. Lives in the library so integration tests can drive
/// the service in-process.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/jobs", get(handlers::jobs::list).post(handlers::jobs::create))
        .route(
            "/jobs/:id",
            get(handlers::jobs::get)
                .patch(handlers::jobs::update)
                .delete(handlers::jobs::remove),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
