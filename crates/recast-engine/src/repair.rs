//! Failure-driven repair
//!
//! The shared primitive behind every retry loop: feed the failing command's
//! output back into a generation request and apply the returned file
//! replacements in place. Always safe to call again with fresh failure
//! output. The bound lives in [`RetryPolicy`], owned by the caller.

use crate::context::MigrationContext;
use crate::error::EngineError;
use crate::prompts;
use crate::writer::persist_files;
use recast_fs::{build_directory_structure, read_to_string};
use recast_llm::LlmResponse;
use std::path::Path;
use std::time::Duration;

/// Bound on repair-and-retry loops.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Failures tolerated per phase before giving up
    pub max_attempts: u32,
    /// Pause before re-probing a freshly (re)started environment
    pub readiness_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            readiness_pause: Duration::from_secs(1),
        }
    }
}

/// Applies model-proposed fixes to the target tree.
#[derive(Debug)]
pub struct RepairEngine<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> RepairEngine<'a> {
    /// Create a repair engine over a context.
    #[inline]
    #[must_use]
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Repair application code after a failed environment build or test run.
    ///
    /// `relevant_files` are target-relative (source-relative as fallback)
    /// paths whose content gives the model context. Returns the number of
    /// files rewritten.
    pub async fn repair_code(
        &self,
        failure: &str,
        relevant_files: &[String],
    ) -> Result<usize, EngineError> {
        let relevant = self.collect_relevant(relevant_files);
        let target_tree = build_directory_structure(&self.ctx.target_dir);
        let prompt = prompts::repair_code(self.ctx, failure, &relevant, &target_tree);
        self.apply(&prompt).await
    }

    /// Repair a generated test artifact after a failed validation run.
    pub async fn repair_test(&self, failure: &str, test_file: &Path) -> Result<usize, EngineError> {
        let content = read_to_string(test_file)?;
        let name = test_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let prompt = prompts::repair_test(self.ctx, failure, &name, &content);
        self.apply(&prompt).await
    }

    async fn apply(&self, prompt: &str) -> Result<usize, EngineError> {
        let completion = self.ctx.llm().complete(prompt).await?;
        match LlmResponse::parse(&completion) {
            LlmResponse::Instruction(text) => {
                tracing::info!(%text, "repair returned guidance instead of fixes");
                Ok(0)
            }
            LlmResponse::Files { files, .. } => {
                if files.is_empty() {
                    tracing::warn!("repair response carried no files");
                    return Ok(0);
                }
                let names = persist_files(self.ctx, &files)?;
                tracing::info!(rewritten = names.len(), "applied repair");
                Ok(names.len())
            }
        }
    }

    /// Concatenate the content of files relevant to a failure, preferring the
    /// target tree and falling back to the source tree.
    fn collect_relevant(&self, files: &[String]) -> String {
        let mut out = String::new();
        for file in files {
            let target = self.ctx.target_path(file);
            let source = self.ctx.source_path(file);
            let content = read_to_string(&target).or_else(|_| read_to_string(&source));
            if let Ok(content) = content {
                out.push_str(&format!("{file}:\n```\n{content}\n```\n\n"));
            }
        }
        out
    }
}
