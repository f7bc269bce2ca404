use serde::{Deserialize, Serialize};

// POST /send-otp body
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SendOtpRequest {
    pub email: Option<String>,
    // free-form, unknown purposes still get a generic email
    pub purpose: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub development_mode: bool,
    // only honoured outside production
    pub otp: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SendOtpResponse {
    Sent {
        success: bool,
        message: &'static str,
        timestamp: String,
    },
    // development short-circuit: the code leaks in the response on purpose
    Development {
        success: bool,
        message: &'static str,
        otp_code: String,
        development: bool,
    },
}

#[derive(Serialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct RelayConfigView {
    pub host: String,
    pub port: u16,
    pub user: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct TestSmtpResponse {
    pub success: bool,
    pub message: &'static str,
    pub config: RelayConfigView,
}
