use std::sync::Arc;

use crate::config::{Args, Mode};
use crate::cors::OriginPolicy;
use crate::mailer::MailRelay;
use crate::rate_limit::{RateLimiter, RateLimiterConfig};

// Relay coordinates reported by /test-smtp (never the password)
#[derive(Debug, Clone)]
pub struct RelayInfo {
    pub host: String,
    pub port: u16,
    pub user: String,
}

// app's shared state
pub struct AppState {
    pub mode: Mode,
    pub brand: String,                   // shown in the email header
    pub rate_limiter: RateLimiter,
    pub windows: Vec<RateLimiterConfig>, // hourly, daily
    pub relay: Arc<dyn MailRelay>,
    pub relay_info: RelayInfo,
    pub origins: Arc<OriginPolicy>,
}

impl AppState {
    pub fn new(args: &Args, relay: Arc<dyn MailRelay>) -> Self {
        Self {
            mode: args.mode,
            brand: args.from_name.clone(),
            rate_limiter: RateLimiter::new(),
            windows: args.windows(),
            relay,
            relay_info: RelayInfo {
                host: args.smtp_host.clone(),
                port: args.smtp_port,
                user: args.smtp_user.clone(),
            },
            origins: Arc::new(OriginPolicy::new(args.origins(), !args.mode.is_production())),
        }
    }
}
