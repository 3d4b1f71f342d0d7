use std::env;
use tracing::warn;

pub const DEFAULT_CLINIC_API_URL: &str = "http://localhost:8083/api";
pub const DEFAULT_SLOT_WINDOWS: &str = "9-17";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_api_url: String,
    pub jwt_secret: String,
    /// Raw slot window policy, e.g. `9-17`, `7-10,17-22`, `business` or `split`.
    pub slot_windows: String,
    pub bind_addr: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clinic_api_url: DEFAULT_CLINIC_API_URL.to_string(),
            jwt_secret: String::new(),
            slot_windows: DEFAULT_SLOT_WINDOWS.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            clinic_api_url: env::var("CLINIC_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_URL not set, using default {}", DEFAULT_CLINIC_API_URL);
                    DEFAULT_CLINIC_API_URL.to_string()
                }),
            jwt_secret: env::var("CLINIC_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            slot_windows: env::var("CLINIC_SLOT_WINDOWS")
                .unwrap_or_else(|_| DEFAULT_SLOT_WINDOWS.to_string()),
            bind_addr: env::var("CLINIC_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            request_timeout_secs: match env::var("CLINIC_REQUEST_TIMEOUT_SECS") {
                Ok(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("CLINIC_REQUEST_TIMEOUT_SECS '{}' is not a number, using {}", raw, DEFAULT_REQUEST_TIMEOUT_SECS);
                    DEFAULT_REQUEST_TIMEOUT_SECS
                }),
                Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
            },
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.clinic_api_url.is_empty() && !self.jwt_secret.is_empty()
    }
}
