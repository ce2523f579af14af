//! Error types for the court scheduler API client

/// Status text carried by every transport-level failure
pub const NETWORK_ERROR_STATUS_TEXT: &str = "Network Error";

/// Errors returned by the court scheduler API client
///
/// A status of `0` is the sentinel for "no HTTP response was received"
/// (DNS failure, refused connection, timeout, unreadable body). Any other
/// status is the status of a response the server actually sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("API request failed: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("{message}")]
    Unavailable { message: String },
}

impl ApiError {
    /// Build a transport-level failure from any underlying error
    pub fn network(err: impl std::fmt::Display) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }

    /// Build an HTTP error response failure
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            status_text: status_text.into(),
        }
    }

    /// Build a failure without status information
    pub fn unavailable(message: impl Into<String>) -> Self {
        ApiError::Unavailable {
            message: message.into(),
        }
    }

    /// HTTP status, `Some(0)` for network failures, `None` when unknown
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network { .. } => Some(0),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unavailable { .. } => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ApiError::Network { .. } => Some(NETWORK_ERROR_STATUS_TEXT),
            ApiError::Http { status_text, .. } => Some(status_text),
            ApiError::Unavailable { .. } => None,
        }
    }

    /// Human readable message, identical to the `Display` output
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// True for responses with a status in `[400, 500)`
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if (400..500).contains(status))
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
