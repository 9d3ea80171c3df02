//! Shared utilities for the KRX bot
//!
//! Currently this is the logging bootstrap: a tracing-subscriber setup that
//! redacts Telegram bot tokens from every emitted log line. The Bot API puts
//! the token in the request path, so any logged URL or error chain would leak
//! it without this.

pub mod logging;

pub use logging::{init_tracing, redact_bot_token};
