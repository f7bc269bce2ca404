use axum::Json;

use crate::models::HealthResponse;

pub const SERVICE_NAME: &str = "OTP Mailer";

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
