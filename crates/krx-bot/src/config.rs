//! Bot configuration

use crate::error::{BotError, Result};

/// Default Gemini model used for report generation
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// How many updates may be handled at the same time
pub const DEFAULT_CONCURRENT_UPDATES: usize = 2;

/// How far back to search for the latest published fundamentals
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;

/// Long-poll window for getUpdates, in seconds
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration, assembled from the environment at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub telegram_token: String,
    /// Gemini API key
    pub google_api_key: String,
    /// Gemini model name
    pub model: String,
    /// Concurrency cap for update handling
    pub concurrent_updates: usize,
    /// Lookback window for fundamentals, in days
    pub lookback_days: i64,
    /// Long-poll window, in seconds
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    /// Read configuration from the environment.
    ///
    /// `TELEGRAM_TOKEN` and `GOOGLE_API_KEY` are required; the process must
    /// not come up without them. Everything else has defaults.
    pub fn from_env() -> Result<Self> {
        let telegram_token = std::env::var("TELEGRAM_TOKEN")
            .map_err(|_| BotError::Config("TELEGRAM_TOKEN is not set".to_string()))?;
        let google_api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| BotError::Config("GOOGLE_API_KEY is not set".to_string()))?;

        let mut config = Self::new(telegram_token, google_api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("CONCURRENT_UPDATES") {
            config.concurrent_updates = raw
                .parse()
                .map_err(|_| BotError::Config(format!("bad CONCURRENT_UPDATES: {raw:?}")))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration with defaults for everything optional
    pub fn new(telegram_token: impl Into<String>, google_api_key: impl Into<String>) -> Self {
        Self {
            telegram_token: telegram_token.into(),
            google_api_key: google_api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            concurrent_updates: DEFAULT_CONCURRENT_UPDATES,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }

    /// Set the Gemini model name
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the update concurrency cap
    #[must_use]
    pub fn with_concurrent_updates(mut self, cap: usize) -> Self {
        self.concurrent_updates = cap;
        self
    }

    /// Set the fundamentals lookback window
    #[must_use]
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    /// Check the configuration for values the bot cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(BotError::Config("telegram token is empty".to_string()));
        }
        if self.google_api_key.trim().is_empty() {
            return Err(BotError::Config("google api key is empty".to_string()));
        }
        if self.concurrent_updates == 0 {
            return Err(BotError::Config(
                "concurrent_updates must be at least 1".to_string(),
            ));
        }
        if self.lookback_days <= 0 {
            return Err(BotError::Config(
                "lookback_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
