use std::env;
use std::time::Duration;

use practice_core::model::AuthToken;
use storage::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpConfig};

use crate::error::ConfigError;

pub const API_URL_VAR: &str = "PRACTICE_API_URL";
pub const API_TOKEN_VAR: &str = "PRACTICE_API_TOKEN";
pub const TIMEOUT_VAR: &str = "PRACTICE_REQUEST_TIMEOUT_SECS";

/// Remote endpoint and session credentials.
#[derive(Clone, Debug)]
pub struct PracticeConfig {
    pub http: HttpConfig,
    pub token: Option<AuthToken>,
}

impl PracticeConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or timeout is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`PracticeConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or timeout is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };
        let token = lookup(API_TOKEN_VAR).and_then(AuthToken::new);
        Ok(Self {
            http: HttpConfig::new(&base_url, timeout)?,
            token,
        })
    }

    /// Override the base URL, keeping the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is invalid.
    pub fn with_api_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.http = HttpConfig::new(base_url, self.http.timeout)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<AuthToken>) -> Self {
        self.token = token;
        self
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            var: TIMEOUT_VAR,
            raw: raw.to_owned(),
        }),
    }
}
