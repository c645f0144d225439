//! Configuration management for the EventPulse client.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8081/api";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the event API, without a trailing slash
    pub api_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Delay between a successful booking and the dashboard redirect
    pub redirect_delay: Duration,
    /// Number of events shown in the home view's featured strip
    pub featured_count: usize,
    /// Upper bound the CLI waits for a view to settle
    pub effect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            redirect_delay: Duration::from_millis(2000),
            featured_count: 3,
            effect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `EVENTPULSE_API_URL` | `http://localhost:8081/api` |
    /// | `EVENTPULSE_REQUEST_TIMEOUT_SECS` | unset (no timeout) |
    /// | `EVENTPULSE_REDIRECT_DELAY_MS` | `2000` |
    /// | `EVENTPULSE_FEATURED_COUNT` | `3` |
    /// | `EVENTPULSE_EFFECT_TIMEOUT_SECS` | `10` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to a value that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup("EVENTPULSE_API_URL") {
            Some(url) => normalize_api_url(&url)?,
            None => defaults.api_url,
        };

        Ok(Self {
            api_url,
            request_timeout: parse_var(&lookup, "EVENTPULSE_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            redirect_delay: parse_var(&lookup, "EVENTPULSE_REDIRECT_DELAY_MS")?
                .map_or(defaults.redirect_delay, Duration::from_millis),
            featured_count: parse_var(&lookup, "EVENTPULSE_FEATURED_COUNT")?
                .unwrap_or(defaults.featured_count),
            effect_timeout: parse_var(&lookup, "EVENTPULSE_EFFECT_TIMEOUT_SECS")?
                .map_or(defaults.effect_timeout, Duration::from_secs),
        })
    }

    /// Replace the API base URL (command-line override).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `url` is not an http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(url)?;
        Ok(self)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

fn normalize_api_url(url: &str) -> Result<String, ConfigError> {
    let parsed = reqwest::Url::parse(url.trim()).map_err(|e| ConfigError::InvalidUrl {
        value: url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: url.to_string(),
            reason: format!("unsupported scheme {:?}", parsed.scheme()),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
