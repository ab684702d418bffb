//! Backend HTTP error types.

use thiserror::Error;

/// Errors from the backend HTTP API.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum BackendError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode backend response: {message}")]
    Decode { message: String },

    #[error("invalid backend url: {message}")]
    InvalidUrl { message: String },

    #[error("unexpected backend error: {message}")]
    Unexpected { message: String },
}

impl BackendError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether the request never got a response.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode { .. } | Self::InvalidUrl { .. } | Self::Unexpected { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(BackendError::network("refused").is_recoverable());
        assert!(BackendError::status(503, "down").is_recoverable());
        assert!(BackendError::status(429, "slow down").is_recoverable());
        assert!(!BackendError::status(404, "no such course").is_recoverable());
        assert!(!BackendError::decode("bad json").is_recoverable());
    }
}
