//! Error types for the bot

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that can occur while running the bot
#[derive(Debug, Error)]
pub enum BotError {
    /// The Telegram Bot API answered with ok=false
    #[error("Telegram API error: {0}")]
    Telegram(String),

    /// Market data lookup failed
    #[error("Market data error: {0}")]
    Market(#[from] krx_data::KrxError),

    /// Report generation failed
    #[error("LLM error: {0}")]
    Llm(#[from] bot_llm::LLMError),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
