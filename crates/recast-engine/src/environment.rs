//! Environment setup around the migration
//!
//! The setup phase generates the container manifest for the target tree; the
//! post-migration pass copies static assets over, generates the dependency
//! manifest from the accumulated external names, and refines the container
//! manifest against it.

use crate::context::MigrationContext;
use crate::error::EngineError;
use crate::memory::{MemoryKind, MemoryStore};
use crate::prompts;
use crate::writer::persist_files;
use recast_fs::{build_directory_structure, copy_static_files, read_to_string};
use recast_llm::LlmResponse;

/// Files never copied from the source tree into the target tree.
const EXCLUDED_FILES: &[&str] = &["Dockerfile", "docker-compose.yml", ".gitignore", ".env"];

/// Generates and refines the target environment's manifests.
#[derive(Debug)]
pub struct EnvironmentBuilder<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> EnvironmentBuilder<'a> {
    /// Create a builder over a context.
    #[inline]
    #[must_use]
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Setup phase: generate the container manifest for the target tree.
    pub async fn create_environment(&self) -> Result<(), EngineError> {
        let target_tree = build_directory_structure(&self.ctx.target_dir);
        let prompt = prompts::dockerfile(self.ctx, &target_tree);
        let written = self.generate(&prompt).await?;
        if written == 0 {
            tracing::warn!("container manifest generation produced no files");
        }
        Ok(())
    }

    /// Post-migration pass: static assets, dependency manifest, refined
    /// container manifest.
    pub async fn add_env_files(&self, memory: &MemoryStore) -> Result<(), EngineError> {
        let copied = copy_static_files(&self.ctx.source_dir, &self.ctx.target_dir, EXCLUDED_FILES)?;
        tracing::info!(copied, "copied static assets into target tree");

        let dockerfile_path = self.ctx.target_path("Dockerfile");
        let Ok(dockerfile_content) = read_to_string(&dockerfile_path) else {
            tracing::warn!("no Dockerfile in target tree; skipping manifest refinement");
            return Ok(());
        };

        let external = memory.entries(MemoryKind::ExternalDependencies);
        let target_tree = build_directory_structure(&self.ctx.target_dir);

        let prompt =
            prompts::dependency_manifest(self.ctx, &dockerfile_content, &external, &target_tree);
        let completion = self.ctx.llm().complete(&prompt).await?;
        let manifest = match LlmResponse::parse(&completion) {
            LlmResponse::Files { files, .. } if !files.is_empty() => {
                persist_files(self.ctx, &files)?;
                files.into_iter().next()
            }
            _ => None,
        };
        let Some(manifest) = manifest else {
            tracing::warn!("dependency manifest generation produced no files");
            return Ok(());
        };

        let prompt = prompts::refine_dockerfile(
            self.ctx,
            &dockerfile_content,
            &manifest.filename,
            &manifest.content,
        );
        let written = self.generate(&prompt).await?;
        if written > 0 {
            tracing::info!("refined container manifest against {}", manifest.filename);
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<usize, EngineError> {
        let completion = self.ctx.llm().complete(prompt).await?;
        match LlmResponse::parse(&completion) {
            LlmResponse::Instruction(text) => {
                tracing::info!(%text, "environment generation returned guidance");
                Ok(0)
            }
            LlmResponse::Files { files, .. } => {
                if files.is_empty() {
                    return Ok(0);
                }
                Ok(persist_files(self.ctx, &files)?.len())
            }
        }
    }
}
