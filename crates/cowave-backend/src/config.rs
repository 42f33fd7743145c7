use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Connection settings for the managed backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Project API key, sent as both `apikey` and bearer token.
    pub key: String,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Reads `COWAVE_BACKEND_URL`, `COWAVE_BACKEND_KEY` and the optional
    /// `COWAVE_HTTP_TIMEOUT_SECS` (default 10). Loads `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url = std::env::var("COWAVE_BACKEND_URL")
            .map_err(|_| ConfigError::Missing("COWAVE_BACKEND_URL"))?;
        let key = std::env::var("COWAVE_BACKEND_KEY")
            .map_err(|_| ConfigError::Missing("COWAVE_BACKEND_KEY"))?;

        let timeout_secs: u64 = match std::env::var("COWAVE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("COWAVE_HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => 10,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
