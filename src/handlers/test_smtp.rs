use axum::{Json, extract::State};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{RelayConfigView, TestSmtpResponse};
use crate::state::AppState;

// Diagnostic only: can we reach and authenticate with the relay?
pub async fn test_smtp_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestSmtpResponse>, ApiError> {
    if let Err(e) = state.relay.verify().await {
        tracing::error!(error = %e, host = %state.relay_info.host, "smtp connection test failed");
        let message = if state.mode.is_production() {
            "SMTP connection failed".to_string()
        } else {
            e.to_string()
        };
        return Err(ApiError::SmtpConnectionFailed(message));
    }

    let info = &state.relay_info;
    Ok(Json(TestSmtpResponse {
        success: true,
        message: "SMTP connection successful",
        config: RelayConfigView {
            host: info.host.clone(),
            port: info.port,
            user: info.user.clone(),
        },
    }))
}
