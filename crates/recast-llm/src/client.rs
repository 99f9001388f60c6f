//! Model client trait and request parameters
//!
//! The transport (HTTP provider, local process, test double) lives behind
//! [`LlmClient`]; the engine only sees prompt-in, completion-out.

use async_trait::async_trait;

/// Request parameters shared by every completion call.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model label understood by the backing provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token budget
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini/gemini-1.5-flash".to_string(),
            temperature: 0.0,
            max_tokens: 10_000,
        }
    }
}

/// Model client errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The backing provider rejected or failed the request
    #[error("completion request failed: {0}")]
    Request(String),

    /// The provider returned an empty completion
    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

/// Completion collaborator
///
/// One prompt string in, one completion string out. Streamed transports
/// concatenate chunks before returning.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run a single completion request to the end.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Request parameters this client was configured with.
    fn config(&self) -> &LlmConfig;
}
