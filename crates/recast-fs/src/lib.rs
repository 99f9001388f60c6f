//! Filesystem scanning for recast
//!
//! Everything the engine needs to know about the source tree before the first
//! model call: which language it is written in, what its directory structure
//! looks like (rendered for prompts), and which static assets carry over to
//! the target tree untouched.

pub mod copy;
pub mod lang;
pub mod tree;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use copy::copy_static_files;
pub use lang::detect_language;
pub use tree::{build_directory_structure, near_directory_structure};

/// Filesystem errors with path context.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Read failed
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Write failed
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copy failed
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read a file to a string with path context on failure.
pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    fs::read_to_string(path).map_err(|source| FsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write content, creating parent directories first.
pub fn write_with_dirs(path: &Path, content: &str) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| FsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| FsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// In-place content substitution, used to rewire ports in generated tests.
pub fn find_and_replace(path: &Path, find: &str, replace: &str) -> Result<(), FsError> {
    let content = read_to_string(path)?;
    let replaced = content.replace(find, replace);
    fs::write(path, replaced).map_err(|source| FsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
