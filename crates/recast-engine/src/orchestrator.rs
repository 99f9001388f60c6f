//! Dependency-first migration traversal
//!
//! Depth-first post-order walk from the entry file: every internal dependency
//! is translated before its dependent. Two explicit sets keep the walk sane:
//! a completed map enforcing the translate-at-most-once invariant even when
//! siblings share a dependency, and an in-progress set that breaks true
//! dependency cycles (A -> B -> A) by treating an in-flight file as already
//! satisfied.

use crate::context::MigrationContext;
use crate::depmap::DependencyMap;
use crate::error::EngineError;
use crate::memory::MemoryStore;
use crate::resolver::DependencyResolver;
use crate::writer::TranslationWriter;
use futures::future::BoxFuture;
use indexmap::IndexSet;
use std::collections::HashMap;

/// Drives translation order over the dependency tree.
#[derive(Debug)]
pub struct MigrationOrchestrator<'a> {
    ctx: &'a MigrationContext,
    memory: &'a MemoryStore,
    dep_map: DependencyMap,
    in_progress: IndexSet<String>,
    completed: HashMap<String, Option<String>>,
}

impl<'a> MigrationOrchestrator<'a> {
    /// Create an orchestrator over a context and memory store.
    #[must_use]
    pub fn new(ctx: &'a MigrationContext, memory: &'a MemoryStore) -> Self {
        Self {
            ctx,
            memory,
            dep_map: DependencyMap::new(),
            in_progress: IndexSet::new(),
            completed: HashMap::new(),
        }
    }

    /// Migrate the context's entry file and everything it depends on.
    pub async fn migrate_entry(&mut self) -> Result<(), EngineError> {
        let entry = self.ctx.source_entry.clone();
        tracing::info!(entry, "starting migration traversal");
        self.migrate(entry, None).await?;
        tracing::info!(
            files = self.completed.len(),
            "migration traversal complete"
        );
        Ok(())
    }

    /// Recursively ensure `file` and its internal dependencies are translated,
    /// dependencies first, recording produced filenames under `parent`.
    fn migrate(
        &mut self,
        file: String,
        parent: Option<String>,
    ) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            // Shared dependency: already produced, only record under this parent.
            if let Some(produced) = self.completed.get(&file) {
                if let Some(name) = produced.clone() {
                    self.dep_map.record(parent.as_deref(), &name);
                }
                return Ok(());
            }

            // Cycle: the file is somewhere up the current descent. Treat the
            // edge as satisfied; the file will finish on the way back up.
            if self.in_progress.contains(&file) {
                tracing::warn!(
                    file,
                    chain = ?self.in_progress,
                    "dependency cycle detected; skipping edge"
                );
                return Ok(());
            }
            self.in_progress.insert(file.clone());

            let record = DependencyResolver::new(self.ctx, self.memory)
                .resolve(&file)
                .await?;

            for dep in &record.internal {
                self.migrate(dep.trim().to_string(), Some(file.clone())).await?;
            }

            let migrated_deps = self.dep_map.produced_for(&file).to_vec();
            let produced = TranslationWriter::new(self.ctx)
                .write(&file, &record.external, &migrated_deps)
                .await?;

            self.in_progress.shift_remove(&file);
            if let Some(name) = &produced {
                self.dep_map.record(parent.as_deref(), name);
            } else {
                tracing::warn!(file, "no target file produced; parent will not reference it");
            }
            self.completed.insert(file, produced);
            Ok(())
        })
    }

    /// The dependency bookkeeping accumulated so far.
    #[inline]
    #[must_use]
    pub fn dependency_map(&self) -> &DependencyMap {
        &self.dep_map
    }

    /// Number of source files translated (or attempted) this run.
    #[inline]
    #[must_use]
    pub fn files_visited(&self) -> usize {
        self.completed.len()
    }
}
