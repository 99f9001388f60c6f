//! Translation output persistence
//!
//! One generation request per file; the tagged response either carries files
//! (persisted under the target root, overwriting) or operator guidance
//! (surfaced, nothing written). A zero-file response is non-fatal but logged.

use crate::context::MigrationContext;
use crate::error::EngineError;
use crate::prompts;
use recast_fs::{build_directory_structure, read_to_string, write_with_dirs};
use recast_llm::{GeneratedFile, LlmResponse};

/// Produces and persists a translated file given its resolved dependencies.
#[derive(Debug)]
pub struct TranslationWriter<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> TranslationWriter<'a> {
    /// Create a writer over a context.
    #[inline]
    #[must_use]
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    /// Translate `source_file` and persist the result.
    ///
    /// Returns the first produced target filename, or `None` when the model
    /// answered with guidance or an empty batch.
    pub async fn write(
        &self,
        source_file: &str,
        external_deps: &[String],
        migrated_deps: &[String],
    ) -> Result<Option<String>, EngineError> {
        let content = read_to_string(&self.ctx.source_path(source_file))?;
        let target_tree = build_directory_structure(&self.ctx.target_dir);

        let prompt = prompts::translate(
            self.ctx,
            source_file,
            &content,
            external_deps,
            migrated_deps,
            &target_tree,
        );
        let completion = self.ctx.llm().complete(&prompt).await?;

        match LlmResponse::parse(&completion) {
            LlmResponse::Instruction(text) => {
                tracing::info!(file = source_file, %text, "model returned guidance instead of code");
                Ok(None)
            }
            LlmResponse::Files {
                files,
                dropped_sections,
            } => {
                if files.is_empty() {
                    if dropped_sections > 0 {
                        tracing::warn!(
                            file = source_file,
                            dropped_sections,
                            "translation response was unparseable; nothing persisted"
                        );
                    } else {
                        tracing::warn!(
                            file = source_file,
                            "translation response carried no files"
                        );
                    }
                    return Ok(None);
                }
                let names = persist_files(self.ctx, &files)?;
                Ok(names.into_iter().next())
            }
        }
    }
}

/// Write generated files under the target root, creating parent directories
/// and overwriting existing files. Shared with the repair loop.
pub(crate) fn persist_files(
    ctx: &MigrationContext,
    files: &[GeneratedFile],
) -> Result<Vec<String>, EngineError> {
    let mut names = Vec::with_capacity(files.len());
    for file in files {
        let path = ctx.target_path(&file.filename);
        write_with_dirs(&path, &file.content)?;
        tracing::info!(
            file = %file.filename,
            language = %file.language,
            "created {} at {}",
            file.filename,
            ctx.target_dir.display()
        );
        names.push(file.filename.clone());
    }
    Ok(names)
}
