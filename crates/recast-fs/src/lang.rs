//! Source language detection by extension census

use indexmap::IndexMap;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions that never vote in the census (build output, lockfiles, media).
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    "pyc", "class", "o", "so", "dll", "exe", "lock", "png", "jpg", "jpeg", "gif", "svg", "ico",
    "zip", "tar", "gz", "woff", "woff2", "ttf", "eot", "map",
];

/// Extensions of static assets copied verbatim into the target tree.
pub const INCLUDED_STATIC_EXTENSIONS: &[&str] = &[
    "html", "css", "json", "yml", "yaml", "txt", "md", "png", "jpg", "jpeg", "gif", "svg", "ico",
];

/// Extension to language label mapping.
const EXTENSION_TO_LANGUAGE: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "nodejs"),
    ("jsx", "nodejs"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("php", "php"),
    ("cs", "csharp"),
    ("c", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("swift", "swift"),
];

/// Guess the source language from the most common mapped file extension.
///
/// Returns `None` when the tree holds no files with a mapped extension.
#[must_use]
pub fn detect_language(source_dir: &Path) -> Option<String> {
    let mut census: IndexMap<String, usize> = IndexMap::new();

    for entry in WalkDir::new(source_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if EXCLUDED_EXTENSIONS.contains(&ext) {
            continue;
        }
        *census.entry(ext.to_string()).or_insert(0) += 1;
    }

    let (most_common, count) = census.into_iter().max_by_key(|(_, count)| *count)?;
    tracing::debug!(extension = %most_common, count, "most common source extension");

    language_for_extension(&most_common).map(str::to_string)
}

/// Language label for an extension, if mapped.
#[must_use]
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    EXTENSION_TO_LANGUAGE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}
