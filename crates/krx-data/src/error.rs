//! Error types for KRX data operations

use thiserror::Error;

/// Result type alias for KRX data operations
pub type Result<T> = std::result::Result<T, KrxError>;

/// Errors that can occur while talking to the KRX data service
#[derive(Debug, Error)]
pub enum KrxError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered but not with what we asked for
    #[error("KRX API error: {0}")]
    Api(String),

    /// A wire value could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
