//! Async state of a fetch.

use crate::error::ApiError;

/// The state of data a view fetches on activation
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// Request in flight
    Pending,
    /// Request succeeded
    Loaded(T),
    /// Request failed
    Failed(ApiError),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> Loadable<T> {
    /// Whether a request is still outstanding
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The loaded value, if any
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> From<Result<T, ApiError>> for Loadable<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(error) => Self::Failed(error),
        }
    }
}
