//! LLM provider abstraction for the KRX bot
//!
//! The bot treats the generative model as a black box: a prompt string goes
//! in, report text comes out. This crate provides:
//!
//! - Generation request/response types
//! - The [`LLMProvider`] trait for model backends
//! - Concrete provider implementations (behind feature flags)

pub mod error;
pub mod generation;
pub mod provider;

// Re-export main types
pub use error::{LLMError, Result};
pub use generation::{GenerationRequest, GenerationResponse, TokenUsage};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
