//! Error types for the court dashboard service

/// Errors that can occur in the court dashboard service
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dashboard server error: {0}")]
    Server(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
