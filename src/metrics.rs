use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};


lazy_static! {
    pub static ref OTP_REQUESTS_TOTAL: Counter =
        register_counter!("otp_requests_total", "Total number of send-otp requests").unwrap();
    pub static ref OTP_SENT_TOTAL: Counter =
        register_counter!("otp_sent_total", "OTP emails accepted by the relay").unwrap();
    pub static ref OTP_RATE_LIMITED_TOTAL: Counter =
        register_counter!("otp_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref OTP_SEND_FAILURES_TOTAL: Counter =
        register_counter!("otp_send_failures_total", "Relay failures").unwrap();
    pub static ref OTP_DEV_SHORT_CIRCUIT_TOTAL: Counter =
        register_counter!("otp_dev_short_circuit_total", "Codes returned without sending (development)").unwrap();
    pub static ref RELAY_LATENCY: Histogram = register_histogram!(
        "otp_relay_latency_seconds",
        "Time spent handing a message to the relay"
    )
    .unwrap();
}
