//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, logging_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health & Status
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        // Approvals
        .route("/approvals/score", post(handlers::score_approvals))
        .route("/allowance/format", post(handlers::format_allowance))
        // Trust score
        .route("/trust/compose", post(handlers::compose_trust))
        .route("/time-ago", post(handlers::get_time_ago))
        // Scans
        .route("/scans", post(handlers::create_scan));

    Router::new()
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        .with_state(state.clone())
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), logging_middleware))
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
        .layer(middleware::from_fn(auth_middleware))
}
