pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod metrics;
pub mod models;
pub mod otp;
pub mod rate_limit;
pub mod state;
pub mod telemetry;
pub mod templates;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let origins = Arc::clone(&state.origins);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/send-otp", post(handlers::send_otp_handler))
        .route("/test-smtp", post(handlers::test_smtp_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
        .layer(middleware::from_fn_with_state(Arc::clone(&origins), cors::enforce_origin))
        .layer(cors::cors_layer(origins))
        .layer(TraceLayer::new_for_http())
}
