//! LLM provider trait definition

use crate::{GenerationRequest, GenerationResponse, Result};
use async_trait::async_trait;

/// Trait for text-generation backends
///
/// Implementations provide access to a generative model service. The bot
/// only ever needs one-shot generation: prompt in, text out.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text for the given request
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;

    /// Get the provider name (e.g., "gemini")
    fn name(&self) -> &str;
}
