//! Generation request and response types

use serde::{Deserialize, Serialize};

/// Request for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Optional system prompt (persona, style, output format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The user-facing prompt
    pub prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response from text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text, trimmed
    pub text: String,

    /// Token usage statistics, when the backend reports them
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: usize,

    /// Number of output tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl GenerationRequest {
    /// Create a request with just a prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 2048,
            temperature: None,
        }
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the generation budget
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("hello");
        assert_eq!(request.prompt, "hello");
        assert_eq!(request.max_tokens, 2048);
        assert!(request.system.is_none());
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_request_builder_chain() {
        let request = GenerationRequest::new("question")
            .with_system("persona")
            .with_max_tokens(256)
            .with_temperature(0.4);
        assert_eq!(request.system.as_deref(), Some("persona"));
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, Some(0.4));
    }

    #[test]
    fn test_usage_total() {
        let usage = TokenUsage {
            input_tokens: 120,
            output_tokens: 30,
        };
        assert_eq!(usage.total(), 150);
    }
}
