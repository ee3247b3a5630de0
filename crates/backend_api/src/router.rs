use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, submission::SubmissionService};

/// Create the main application router with all API endpoints
pub fn create_router(service: Arc<SubmissionService>) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Pure calculation
        .route("/api/calculate", post(handlers::calculate))
        // Lead submission and report delivery
        .route("/api/send-report", post(handlers::send_report))
        .route("/api/download-report", post(handlers::download_report))
        .with_state(service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
