use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("malformed request body: {0}")]
    InvalidRequest(String),

    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    // `details` is only filled outside production
    #[error("failed to send OTP")]
    SendFailed { details: Option<String> },

    #[error("smtp connection failed: {0}")]
    SmtpConnectionFailed(String),

    #[error("origin not allowed")]
    OriginNotAllowed,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidEmail => "INVALID_EMAIL",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::SendFailed { .. } => "SEND_FAILED",
            ApiError::SmtpConnectionFailed(_) => "SMTP_CONNECTION_FAILED",
            ApiError::OriginNotAllowed => "CORS_NOT_ALLOWED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidEmail | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::SendFailed { .. } | ApiError::SmtpConnectionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::OriginNotAllowed => StatusCode::FORBIDDEN,
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.code(),
        });
        let message = match self {
            ApiError::InvalidEmail => "Please provide a valid email address".to_string(),
            ApiError::InvalidRequest(_) => "Request body must be a valid JSON object".to_string(),
            ApiError::RateLimited { retry_after } => {
                body["retryAfter"] = json!(retry_after);
                "Too many OTP requests. Please try again later.".to_string()
            }
            ApiError::SendFailed { details } => {
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                "Failed to send OTP. Please try again.".to_string()
            }
            ApiError::SmtpConnectionFailed(msg) => msg.clone(),
            ApiError::OriginNotAllowed => "Not allowed by CORS".to_string(),
        };
        body["message"] = json!(message);
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();
        if let ApiError::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}
