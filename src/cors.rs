use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::ApiError;

// Which browser origins may call us
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    pub allowed: Vec<String>,
    pub allow_any: bool,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>, allow_any: bool) -> Self {
        Self { allowed, allow_any }
    }

    // No Origin header means a native/mobile caller, let it through
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allow_any || self.allowed.iter().any(|o| o == origin),
        }
    }

    fn permits_header(&self, origin: &HeaderValue) -> bool {
        origin.to_str().map(|o| self.permits(Some(o))).unwrap_or(false)
    }
}

// Reject disallowed origins before any handler runs
pub async fn enforce_origin(
    State(policy): State<Arc<OriginPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        if !policy.permits_header(origin) {
            tracing::warn!(origin = ?origin, "rejected cross-origin request");
            return ApiError::OriginNotAllowed.into_response();
        }
    }
    next.run(req).await
}

pub fn cors_layer(policy: Arc<OriginPolicy>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| policy.permits_header(origin),
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
