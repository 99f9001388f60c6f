//! Parent-to-produced-filenames bookkeeping
//!
//! While migrating, the target filenames produced for a file's internal
//! dependencies are recorded under that file's key, so the file's own
//! translation request can reference them for naming and import consistency.
//! The top level is keyed by `None`.

use std::collections::HashMap;

/// Mapping from a source file (or the top level) to the ordered target
/// filenames produced for its migrated internal dependencies.
#[derive(Debug, Default)]
pub struct DependencyMap {
    inner: HashMap<Option<String>, Vec<String>>,
}

impl DependencyMap {
    /// Create an empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a produced target filename under a parent key.
    pub fn record(&mut self, parent: Option<&str>, filename: &str) {
        self.inner
            .entry(parent.map(str::to_string))
            .or_default()
            .push(filename.to_string());
    }

    /// Target filenames produced for `file`'s migrated dependencies, in
    /// production order. Empty when nothing was recorded.
    #[must_use]
    pub fn produced_for(&self, file: &str) -> &[String] {
        self.inner
            .get(&Some(file.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Filenames recorded at the top level.
    #[must_use]
    pub fn top_level(&self) -> &[String] {
        self.inner.get(&None).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_under_parent_key() {
        let mut map = DependencyMap::new();
        map.record(Some("app.py"), "utils.js");
        map.record(Some("app.py"), "models.js");

        assert_eq!(map.produced_for("app.py"), ["utils.js", "models.js"]);
    }

    #[test]
    fn top_level_keyed_separately() {
        let mut map = DependencyMap::new();
        map.record(None, "app.js");

        assert_eq!(map.top_level(), ["app.js"]);
        assert!(map.produced_for("app.py").is_empty());
    }

    #[test]
    fn sibling_keys_are_isolated() {
        let mut map = DependencyMap::new();
        map.record(Some("a.py"), "a_dep.js");
        map.record(Some("b.py"), "b_dep.js");

        assert_eq!(map.produced_for("a.py"), ["a_dep.js"]);
        assert_eq!(map.produced_for("b.py"), ["b_dep.js"]);
    }
}
