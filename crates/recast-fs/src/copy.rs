//! Static-asset copy from source tree to target tree

use crate::lang::INCLUDED_STATIC_EXTENSIONS;
use crate::tree::{matches_pattern, read_gitignore};
use crate::FsError;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copy static assets (included extensions only) from `source_dir` into
/// `target_dir`, preserving relative structure. `excluded_files` are skipped
/// by bare filename.
pub fn copy_static_files(
    source_dir: &Path,
    target_dir: &Path,
    excluded_files: &[&str],
) -> Result<usize, FsError> {
    let patterns = read_gitignore(source_dir);
    let mut copied = 0;

    for entry in WalkDir::new(source_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();

        let included = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| INCLUDED_STATIC_EXTENSIONS.contains(&ext));
        if !included || excluded_files.contains(&name.as_ref()) {
            continue;
        }
        if patterns.iter().any(|p| matches_pattern(&name, p)) {
            continue;
        }

        let Ok(rel) = path.strip_prefix(source_dir) else {
            continue;
        };
        let dest = target_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| FsError::Write {
                path: dest.clone(),
                source,
            })?;
        }
        fs::copy(path, &dest).map_err(|source| FsError::Copy {
            from: path.to_path_buf(),
            to: dest.clone(),
            source,
        })?;
        tracing::debug!(from = %path.display(), to = %dest.display(), "copied static asset");
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_included_extensions_only() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::write(source.path().join("style.css"), "body {}").unwrap();
        fs::write(source.path().join("app.py"), "print(1)").unwrap();

        let copied = copy_static_files(source.path(), target.path(), &[]).unwrap();

        assert_eq!(copied, 1);
        assert!(target.path().join("style.css").exists());
        assert!(!target.path().join("app.py").exists());
    }

    #[test]
    fn preserves_relative_structure() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::create_dir_all(source.path().join("static/img")).unwrap();
        fs::write(source.path().join("static/img/logo.svg"), "<svg/>").unwrap();

        copy_static_files(source.path(), target.path(), &[]).unwrap();

        assert!(target.path().join("static/img/logo.svg").exists());
    }

    #[test]
    fn skips_excluded_files() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::write(source.path().join("secrets.json"), "{}").unwrap();

        let copied = copy_static_files(source.path(), target.path(), &["secrets.json"]).unwrap();

        assert_eq!(copied, 0);
        assert!(!target.path().join("secrets.json").exists());
    }
}
