use clap::{Parser, ValueEnum};

use crate::rate_limit::RateLimiterConfig;

pub const HOUR_SECS: u64 = 3600;
pub const DAY_SECS: u64 = 86_400;

// Operating mode - anything other than production unlocks test helpers
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Production,
    Development,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Development => "development",
        }
    }
}

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "otp-mailer")]
#[command(about = "Rate limited one-time-password mailer")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // SMTP relay host
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.hostinger.com")]
    pub smtp_host: String,

    // 465 = implicit TLS, 587 = STARTTLS
    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER", default_value = "")]
    pub smtp_user: String,

    #[arg(long, env = "SMTP_PASSWORD", default_value = "", hide_env_values = true)]
    pub smtp_password: String,

    // Skip relay certificate validation (shared hosting relays with bad certs)
    #[arg(long, env = "SMTP_ACCEPT_INVALID_CERTS", default_value_t = false)]
    pub smtp_accept_invalid_certs: bool,

    // Sender display name, also used as the brand in the email header
    #[arg(long, env = "FROM_NAME", default_value = "OTP Service")]
    pub from_name: String,

    #[arg(long, env = "FROM_EMAIL", default_value = "no-reply@example.com")]
    pub from_email: String,

    // Allowed cross-origin callers (comma-separated)
    // Example: "https://yourapp.com,capacitor://localhost"
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        default_value = "https://yourapp.com,capacitor://localhost,http://localhost"
    )]
    pub allowed_origins: String,

    // Max OTP emails per recipient per hour
    #[arg(long, env = "RATE_LIMIT_MAX_PER_HOUR", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit_hourly: u32,

    // Max OTP emails per recipient per day
    #[arg(long, env = "RATE_LIMIT_MAX_PER_DAY", default_value_t = 10,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit_daily: u32,

    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Mode::Production)]
    pub mode: Mode,
}

impl Args {
    // Split "a, b,,c" into ["a", "b", "c"]
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    // Hourly window first, then daily
    pub fn windows(&self) -> Vec<RateLimiterConfig> {
        vec![
            RateLimiterConfig::new(self.rate_limit_hourly, HOUR_SECS),
            RateLimiterConfig::new(self.rate_limit_daily, DAY_SECS),
        ]
    }
}
