//! Dependency classification
//!
//! Two model queries per file: one for external (third-party) package names,
//! one for internal (same-tree) file paths, the latter given a pruned view of
//! the directory structure local to the file. A file listing itself as a
//! dependency is stripped before the orchestrator ever sees it.

use crate::context::MigrationContext;
use crate::error::EngineError;
use crate::memory::{MemoryKind, MemoryStore};
use crate::prompts::{self, NO_DEPENDENCIES};
use indexmap::IndexSet;
use recast_fs::{near_directory_structure, read_to_string};
use std::path::Path;

/// A file's classified dependencies.
#[derive(Debug, Clone)]
pub struct DependencyRecord {
    /// The file the record describes, relative to the source root
    pub file: String,
    /// Same-tree dependency paths, ordered, de-duplicated
    pub internal: Vec<String>,
    /// Third-party package names, ordered, de-duplicated
    pub external: Vec<String>,
}

/// Classifies a file's imports through the model collaborator.
#[derive(Debug)]
pub struct DependencyResolver<'a> {
    ctx: &'a MigrationContext,
    memory: &'a MemoryStore,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver over a context and memory store.
    #[inline]
    #[must_use]
    pub fn new(ctx: &'a MigrationContext, memory: &'a MemoryStore) -> Self {
        Self { ctx, memory }
    }

    /// Resolve internal and external dependencies of `file`.
    ///
    /// Side effect: newly discovered names are persisted to the memory store.
    pub async fn resolve(&self, file: &str) -> Result<DependencyRecord, EngineError> {
        let content = read_to_string(&self.ctx.source_path(file))?;

        let external_raw = self
            .ctx
            .llm()
            .complete(&prompts::external_deps(self.ctx, file, &content))
            .await?;
        let external = parse_dep_list(&external_raw);
        self.memory
            .record(MemoryKind::ExternalDependencies, &external)?;

        let near_tree = near_directory_structure(&self.ctx.source_dir, Path::new(file));
        let internal_raw = self
            .ctx
            .llm()
            .complete(&prompts::internal_deps(self.ctx, file, &content, &near_tree))
            .await?;
        let mut internal = parse_dep_list(&internal_raw);

        // Self-dependency guard: a direct cycle would otherwise recurse forever.
        if internal.iter().any(|dep| dep == file) {
            tracing::warn!(
                file,
                "file lists itself as an internal dependency; removing it"
            );
            internal.retain(|dep| dep != file);
        }
        self.memory
            .record(MemoryKind::InternalDependencies, &internal)?;

        tracing::debug!(
            file,
            internal = internal.len(),
            external = external.len(),
            "resolved dependencies"
        );

        Ok(DependencyRecord {
            file: file.to_string(),
            internal,
            external,
        })
    }
}

/// Parse a comma-separated dependency reply; the no-dependencies sentinel
/// normalizes to an empty list, never a singleton.
fn parse_dep_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_DEPENDENCIES {
        return Vec::new();
    }
    let set: IndexSet<String> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != NO_DEPENDENCIES)
        .map(str::to_string)
        .collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dep_list_parses_and_dedups() {
        assert_eq!(
            parse_dep_list("flask, requests,flask , "),
            vec!["flask", "requests"]
        );
    }

    #[test]
    fn dep_list_sentinel_is_empty() {
        assert!(parse_dep_list("NONE").is_empty());
        assert!(parse_dep_list("  NONE  ").is_empty());
        assert!(parse_dep_list("").is_empty());
    }

    #[test]
    fn dep_list_sentinel_inside_list_is_dropped() {
        assert_eq!(parse_dep_list("utils.py, NONE"), vec!["utils.py"]);
    }
}
