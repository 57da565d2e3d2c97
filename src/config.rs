//! Runtime configuration, read once at startup and passed to the client

use crate::FlightError;
use std::env;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub use_mock_data: bool,
    pub api_timeout: Duration,
    /// Development mode answers with mock data when every backend attempt fails
    pub is_development: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            use_mock_data: false,
            api_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            is_development: false,
        }
    }
}

impl AppConfig {
    /// Load from the process environment (and a `.env` file if present)
    pub fn from_env() -> Result<Self, FlightError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FlightError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup("ROUTEWISE_API_URL") {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => {
                info!("ROUTEWISE_API_URL not set, using default: {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            }
        };

        let use_mock_data = lookup("ROUTEWISE_USE_MOCK_DATA").is_some_and(|v| v.trim() == "true");

        let timeout_ms = match lookup("ROUTEWISE_API_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                FlightError::Config(format!("Invalid ROUTEWISE_API_TIMEOUT_MS value {raw:?}: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let is_development = lookup("ROUTEWISE_ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("development"));

        let config = Self {
            api_url,
            use_mock_data,
            api_timeout: Duration::from_millis(timeout_ms),
            is_development,
        };
        debug!(?config, "Configuration loaded");
        Ok(config)
    }
}
