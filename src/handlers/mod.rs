mod health;
mod metrics;
mod send_otp;
mod test_smtp;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use send_otp::send_otp_handler;
pub use test_smtp::test_smtp_handler;
