//! Error types for the EventPulse client

use thiserror::Error;

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the event API
///
/// Carried inside view actions, so it is `Clone` and holds rendered
/// messages rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The requested resource does not exist (HTTP 404)
    #[error("Not found")]
    NotFound,

    /// The response body could not be parsed
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this error means the resource does not exist
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API base URL is not a valid absolute http(s) URL
    #[error("Invalid API URL {value:?}: {reason}")]
    InvalidUrl {
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// An environment variable holds a value that does not parse
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// The rejected value
        value: String,
    },
}

/// A path that does not name any known route
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown route: {0}")]
pub struct RouteParseError(pub String);
