//! Directory-structure snapshots rendered for prompts
//!
//! The full snapshot is taken once at startup and threaded through the
//! context; the near view prunes it to a single file's directory for the
//! internal-dependency query.

use regex::Regex;
use std::fs;
use std::path::Path;

/// Patterns always ignored regardless of `.gitignore`.
const ALWAYS_IGNORED: &[&str] = &[".gitignore", ".git", ".recast-memory", "*.recast-memory/*"];

/// Read `.gitignore` patterns from a directory, if present.
#[must_use]
pub fn read_gitignore(dir: &Path) -> Vec<String> {
    let gitignore = dir.join(".gitignore");
    let Ok(content) = fs::read_to_string(gitignore) else {
        return Vec::new();
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Shell-style wildcard match (`*` and `?`), the subset `.gitignore` entries
/// commonly use.
#[must_use]
pub fn matches_pattern(text: &str, pattern: &str) -> bool {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex).map(|re| re.is_match(text)).unwrap_or(false)
}

fn is_ignored(name: &str, path: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .map(String::as_str)
        .chain(ALWAYS_IGNORED.iter().copied())
        .any(|p| matches_pattern(name, p) || matches_pattern(path, p))
}

/// Render the directory tree under `root` with box-drawing connectors.
///
/// Entries are sorted so consecutive snapshots of an unchanged tree are
/// byte-identical.
#[must_use]
pub fn build_directory_structure(root: &Path) -> String {
    let patterns = read_gitignore(root);
    let mut out = String::new();
    render_dir(root, root, "", &patterns, &mut out);
    out
}

/// Pruned snapshot scoped to `file`'s directory, for dependency queries on
/// large trees.
#[must_use]
pub fn near_directory_structure(root: &Path, file: &Path) -> String {
    let near_root = match file.parent() {
        Some(parent) if parent != Path::new("") => root.join(parent),
        _ => return build_directory_structure(root),
    };
    if !near_root.is_dir() {
        return build_directory_structure(root);
    }
    let patterns = read_gitignore(root);
    let mut out = String::new();
    out.push_str(&format!(
        "{}/\n",
        file.parent().map(|p| p.display().to_string()).unwrap_or_default()
    ));
    render_dir(&near_root, root, "    ", &patterns, &mut out);
    out
}

fn render_dir(dir: &Path, root: &Path, prefix: &str, patterns: &[String], out: &mut String) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
    entries.sort_by_key(|e| e.file_name());

    let visible: Vec<_> = entries
        .into_iter()
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let rel = entry
                .path()
                .strip_prefix(root)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| name.clone());
            !is_ignored(&name, &rel, patterns)
        })
        .collect();

    let count = visible.len();
    for (index, entry) in visible.into_iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();

        if path.is_dir() {
            out.push_str(&format!("{prefix}{connector}{name}/\n"));
            let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            render_dir(&path, root, &child_prefix, patterns, out);
        } else {
            out.push_str(&format!("{prefix}{connector}{name}\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/utils.py"), "").unwrap();
        dir
    }

    #[test]
    fn tree_renders_nested_entries() {
        let dir = fixture();
        let tree = build_directory_structure(dir.path());

        assert!(tree.contains("app.py"));
        assert!(tree.contains("lib/"));
        assert!(tree.contains("utils.py"));
    }

    #[test]
    fn tree_is_deterministic() {
        let dir = fixture();
        let first = build_directory_structure(dir.path());
        let second = build_directory_structure(dir.path());
        assert_eq!(first, second);
    }

    #[test]
    fn tree_honors_gitignore() {
        let dir = fixture();
        fs::write(dir.path().join(".gitignore"), "*.log\nlib\n").unwrap();
        fs::write(dir.path().join("debug.log"), "").unwrap();

        let tree = build_directory_structure(dir.path());
        assert!(!tree.contains("debug.log"));
        assert!(!tree.contains("utils.py"));
        assert!(tree.contains("app.py"));
    }

    #[test]
    fn near_view_scopes_to_file_directory() {
        let dir = fixture();
        let near = near_directory_structure(dir.path(), Path::new("lib/utils.py"));

        assert!(near.contains("utils.py"));
        assert!(!near.contains("app.py"));
    }

    #[test]
    fn near_view_of_top_level_file_is_full_tree() {
        let dir = fixture();
        let near = near_directory_structure(dir.path(), Path::new("app.py"));
        assert!(near.contains("app.py"));
        assert!(near.contains("utils.py"));
    }

    #[test]
    fn wildcard_matching() {
        assert!(matches_pattern("debug.log", "*.log"));
        assert!(matches_pattern("a.py", "?.py"));
        assert!(!matches_pattern("debug.txt", "*.log"));
    }
}
