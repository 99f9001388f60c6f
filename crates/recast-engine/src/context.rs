//! Process-wide migration context
//!
//! Created once at startup and passed by reference through every component.
//! Nothing here is global: two contexts can coexist in one process, which is
//! what the integration tests rely on.

use recast_llm::LlmClient;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration record read by every component.
pub struct MigrationContext {
    /// Source tree root (read-only)
    pub source_dir: PathBuf,
    /// Target tree root (write target)
    pub target_dir: PathBuf,
    /// Per-run dedup records live here
    pub memory_dir: PathBuf,
    /// Source language or framework label
    pub source_lang: String,
    /// Target language or framework label
    pub target_lang: String,
    /// Entrypoint, relative to the source root
    pub source_entry: String,
    /// Rendered snapshot of the source tree, taken once at startup
    pub source_tree: String,
    /// Operating system label for the container manifest
    pub operating_system: String,
    /// Files whose externally visible behavior gets generated tests
    pub test_files: Vec<String>,
    /// Port of the original app, enables cross-validation when set
    pub source_port: Option<u16>,
    /// Port the migrated app listens on
    pub target_port: u16,
    /// Free-text stylistic guidelines carried into every generation request
    pub guidelines: String,
    llm: Arc<dyn LlmClient>,
}

impl MigrationContext {
    /// Create a context with defaults for the optional surface.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let target_dir = target_dir.into();
        let memory_dir = target_dir.join(".recast-memory");
        Self {
            source_dir: source_dir.into(),
            target_dir,
            memory_dir,
            source_lang: String::new(),
            target_lang: String::new(),
            source_entry: String::new(),
            source_tree: String::new(),
            operating_system: "linux".to_string(),
            test_files: Vec::new(),
            source_port: None,
            target_port: 8080,
            guidelines: String::new(),
            llm,
        }
    }

    /// Set source and target language labels.
    #[must_use]
    pub fn with_languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_lang = source.into();
        self.target_lang = target.into();
        self
    }

    /// Set the entrypoint, relative to the source root.
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.source_entry = entry.into();
        self
    }

    /// Set the source-tree snapshot.
    #[must_use]
    pub fn with_source_tree(mut self, tree: impl Into<String>) -> Self {
        self.source_tree = tree.into();
        self
    }

    /// Set the test-bearing files.
    #[must_use]
    pub fn with_test_files(mut self, files: Vec<String>) -> Self {
        self.test_files = files;
        self
    }

    /// Set ports; a source port enables cross-validation.
    #[must_use]
    pub fn with_ports(mut self, source: Option<u16>, target: u16) -> Self {
        self.source_port = source;
        self.target_port = target;
        self
    }

    /// Set stylistic guidelines.
    #[must_use]
    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = guidelines.into();
        self
    }

    /// Set the operating-system label for the container manifest.
    #[must_use]
    pub fn with_operating_system(mut self, os: impl Into<String>) -> Self {
        self.operating_system = os.into();
        self
    }

    /// Override the memory directory.
    #[must_use]
    pub fn with_memory_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.memory_dir = dir.into();
        self
    }

    /// The model collaborator.
    #[inline]
    #[must_use]
    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    /// Absolute path of a source-relative file.
    #[must_use]
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source_dir.join(relative)
    }

    /// Absolute path of a target-relative file.
    #[must_use]
    pub fn target_path(&self, relative: &str) -> PathBuf {
        self.target_dir.join(relative)
    }
}

impl std::fmt::Debug for MigrationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationContext")
            .field("source_dir", &self.source_dir)
            .field("target_dir", &self.target_dir)
            .field("source_lang", &self.source_lang)
            .field("target_lang", &self.target_lang)
            .field("source_entry", &self.source_entry)
            .field("test_files", &self.test_files)
            .field("source_port", &self.source_port)
            .field("target_port", &self.target_port)
            .finish_non_exhaustive()
    }
}
