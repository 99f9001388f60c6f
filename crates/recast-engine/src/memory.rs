//! Append-only dependency memory
//!
//! One line-oriented file per dependency kind under the memory directory.
//! Names are stored once; re-recording an already seen name is a no-op. The
//! external set feeds the dependency-manifest generation after migration.

use crate::error::EngineError;
use indexmap::IndexSet;
use parking_lot::Mutex;
use recast_fs::FsError;
use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

/// Dependency kinds the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    /// Third-party package names
    ExternalDependencies,
    /// Source-tree file paths
    InternalDependencies,
}

impl MemoryKind {
    /// File name under the memory directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::ExternalDependencies => "external_dependencies",
            Self::InternalDependencies => "internal_dependencies",
        }
    }
}

/// Deduplicating, persisted set of previously seen dependency names.
#[derive(Debug)]
pub struct MemoryStore {
    dir: PathBuf,
    sets: Mutex<HashMap<MemoryKind, IndexSet<String>>>,
}

impl MemoryStore {
    /// Open (or create) the store under `dir`, loading any prior records.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| FsError::Write {
            path: dir.clone(),
            source,
        })?;

        let mut sets = HashMap::new();
        for kind in [
            MemoryKind::ExternalDependencies,
            MemoryKind::InternalDependencies,
        ] {
            let path = dir.join(kind.file_name());
            let set: IndexSet<String> = match fs::read_to_string(&path) {
                Ok(content) => content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
                Err(_) => IndexSet::new(),
            };
            sets.insert(kind, set);
        }

        Ok(Self {
            dir,
            sets: Mutex::new(sets),
        })
    }

    /// Record names, returning only those not seen before. New names are
    /// appended to the kind's file.
    pub fn record(&self, kind: MemoryKind, names: &[String]) -> Result<Vec<String>, EngineError> {
        let mut sets = self.sets.lock();
        let set = sets.entry(kind).or_default();

        let fresh: Vec<String> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .filter(|n| !set.contains(*n))
            .map(str::to_string)
            .collect();

        if fresh.is_empty() {
            return Ok(fresh);
        }

        let path = self.dir.join(kind.file_name());
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| FsError::Write {
                path: path.clone(),
                source,
            })?;
        for name in &fresh {
            writeln!(file, "{name}").map_err(|source| FsError::Write {
                path: path.clone(),
                source,
            })?;
            set.insert(name.clone());
        }

        Ok(fresh)
    }

    /// Whether a name was recorded before.
    #[must_use]
    pub fn contains(&self, kind: MemoryKind, name: &str) -> bool {
        self.sets
            .lock()
            .get(&kind)
            .is_some_and(|set| set.contains(name))
    }

    /// All recorded names for a kind, in first-seen order.
    #[must_use]
    pub fn entries(&self, kind: MemoryKind) -> Vec<String> {
        self.sets
            .lock()
            .get(&kind)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("memory")).unwrap();
        (dir, store)
    }

    #[test]
    fn record_returns_only_fresh_names() {
        let (_dir, store) = store();

        let fresh = store
            .record(
                MemoryKind::ExternalDependencies,
                &["flask".to_string(), "requests".to_string()],
            )
            .unwrap();
        assert_eq!(fresh, vec!["flask", "requests"]);

        let fresh = store
            .record(
                MemoryKind::ExternalDependencies,
                &["flask".to_string(), "sqlalchemy".to_string()],
            )
            .unwrap();
        assert_eq!(fresh, vec!["sqlalchemy"]);
    }

    #[test]
    fn record_skips_blank_names() {
        let (_dir, store) = store();
        let fresh = store
            .record(
                MemoryKind::ExternalDependencies,
                &["  ".to_string(), "flask ".to_string()],
            )
            .unwrap();
        assert_eq!(fresh, vec!["flask"]);
    }

    #[test]
    fn store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let memory_dir = dir.path().join("memory");

        let store = MemoryStore::open(&memory_dir).unwrap();
        store
            .record(MemoryKind::InternalDependencies, &["utils.py".to_string()])
            .unwrap();
        drop(store);

        let store = MemoryStore::open(&memory_dir).unwrap();
        assert!(store.contains(MemoryKind::InternalDependencies, "utils.py"));
        assert_eq!(
            store.entries(MemoryKind::InternalDependencies),
            vec!["utils.py"]
        );
    }

    #[test]
    fn kinds_are_isolated() {
        let (_dir, store) = store();
        store
            .record(MemoryKind::ExternalDependencies, &["flask".to_string()])
            .unwrap();
        assert!(!store.contains(MemoryKind::InternalDependencies, "flask"));
    }
}
