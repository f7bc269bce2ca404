use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Mode;
use crate::error::ApiError;
use crate::mailer::OutgoingEmail;
use crate::metrics::{
    OTP_DEV_SHORT_CIRCUIT_TOTAL, OTP_RATE_LIMITED_TOTAL, OTP_REQUESTS_TOTAL,
    OTP_SEND_FAILURES_TOTAL, OTP_SENT_TOTAL, RELAY_LATENCY,
};
use crate::models::{SendOtpRequest, SendOtpResponse};
use crate::otp::{
    OtpPurpose, generate_code, is_valid_email, is_well_formed_code, mask_email, normalize_recipient,
};
use crate::state::AppState;
use crate::templates::render_otp_email;

// Explicit codes are a test-harness hook, ignored in production
fn resolve_code(mode: Mode, explicit: Option<&str>) -> String {
    match explicit {
        Some(code) if !mode.is_production() && is_well_formed_code(code) => code.to_string(),
        Some(_) if !mode.is_production() => {
            tracing::warn!("ignoring malformed explicit otp, generating one");
            generate_code()
        }
        _ => generate_code(),
    }
}

// No JSON content type means no body to read, treat it as `{}`
fn read_payload(payload: Result<Json<SendOtpRequest>, JsonRejection>) -> Result<SendOtpRequest, ApiError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(SendOtpRequest::default()),
        Err(rejection) => {
            let reason = rejection.body_text();
            tracing::debug!(status = %rejection.status(), error = %reason, "rejected otp request body");
            Err(ApiError::InvalidRequest(reason))
        }
    }
}

pub async fn send_otp_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    OTP_REQUESTS_TOTAL.inc();
    let payload = read_payload(payload)?;

    let email = match payload.email.as_deref() {
        Some(email) if is_valid_email(email) => email,
        _ => return Err(ApiError::InvalidEmail),
    };
    let masked = mask_email(email);

    let key = normalize_recipient(email);
    if let Err(limited) = state.rate_limiter.try_consume(&key, &state.windows) {
        OTP_RATE_LIMITED_TOTAL.inc();
        tracing::warn!(
            recipient = %masked,
            window_secs = limited.window_secs,
            retry_after = limited.retry_after_secs,
            "otp rate limit exceeded"
        );
        return Err(ApiError::RateLimited { retry_after: limited.retry_after_secs });
    }

    let code = resolve_code(state.mode, payload.otp.as_deref());

    if payload.development_mode && !state.mode.is_production() {
        OTP_DEV_SHORT_CIRCUIT_TOTAL.inc();
        tracing::warn!(recipient = %masked, otp = %code, "development mode, not sending");
        return Ok(Json(SendOtpResponse::Development {
            success: true,
            message: "OTP generated (development mode)",
            otp_code: code,
            development: true,
        }));
    }

    let purpose = payload
        .purpose
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(OtpPurpose::default().as_str());
    let content = render_otp_email(&state.brand, &code, purpose, payload.name.as_deref());
    let start_time = Instant::now();
    let sent = state
        .relay
        .send(OutgoingEmail { to: email.to_string(), content })
        .await;
    RELAY_LATENCY.observe(start_time.elapsed().as_secs_f64());

    if let Err(e) = sent {
        OTP_SEND_FAILURES_TOTAL.inc();
        tracing::error!(recipient = %masked, error = %e, "failed to send otp");
        let details = (!state.mode.is_production()).then(|| e.to_string());
        return Err(ApiError::SendFailed { details });
    }

    OTP_SENT_TOTAL.inc();
    tracing::info!(recipient = %masked, purpose = %purpose, "otp sent");

    Ok(Json(SendOtpResponse::Sent {
        success: true,
        message: "OTP sent successfully",
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
