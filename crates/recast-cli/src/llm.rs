//! Command-backed model client
//!
//! The model transport stays outside the tool: a user-supplied shell command
//! receives the prompt on stdin and writes the completion to stdout. Request
//! parameters are exported as environment variables so any provider script
//! can pick them up.

use async_trait::async_trait;
use recast_llm::{LlmClient, LlmConfig, LlmError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Shells out to a completion command for every request.
pub struct CommandLlm {
    command: String,
    config: LlmConfig,
}

impl CommandLlm {
    /// Create a client around a shell command.
    pub fn new(command: impl Into<String>, config: LlmConfig) -> Self {
        Self {
            command: command.into(),
            config,
        }
    }
}

#[async_trait]
impl LlmClient for CommandLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("RECAST_MODEL", &self.config.model)
            .env("RECAST_TEMPERATURE", self.config.temperature.to_string())
            .env("RECAST_MAX_TOKENS", self.config.max_tokens.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LlmError::Request(format!("failed to spawn completion command: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| LlmError::Request(format!("failed to write prompt: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| LlmError::Request(format!("completion command failed: {e}")))?;

        if !output.status.success() {
            return Err(LlmError::Request(format!(
                "completion command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let completion = String::from_utf8_lossy(&output.stdout).to_string();
        if completion.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(completion)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn command_llm_pipes_prompt_through() {
        let llm = CommandLlm::new("cat", LlmConfig::default());
        let completion = llm.complete("hello prompt").await.unwrap();
        assert_eq!(completion, "hello prompt");
    }

    #[tokio::test]
    async fn command_llm_surfaces_failure() {
        let llm = CommandLlm::new("exit 3", LlmConfig::default());
        let err = llm.complete("x").await.unwrap_err();
        assert!(matches!(err, LlmError::Request(_)));
    }

    #[tokio::test]
    async fn command_llm_empty_output_is_an_error() {
        let llm = CommandLlm::new("true", LlmConfig::default());
        let err = llm.complete("x").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[tokio::test]
    async fn command_llm_exports_parameters() {
        let llm = CommandLlm::new("printf '%s' \"$RECAST_MODEL\"", LlmConfig::default());
        let completion = llm.complete("x").await.unwrap();
        assert_eq!(completion, "gemini/gemini-1.5-flash");
    }
}
