//! Container runtime collaborator
//!
//! The engine only sees a coarse result: success, or failure with the log
//! text that feeds the repair loop. Infrastructure problems (daemon missing,
//! spawn failure) are reported the same way; the repair loop either fixes
//! the tree or the retry policy gives up.

use async_trait::async_trait;
use std::path::Path;

/// Result of a container build/run or a test execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The operation succeeded.
    Success,
    /// The operation failed; the log text goes to the repair loop.
    Failure(String),
}

impl RunOutcome {
    /// True on success.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure log, if any.
    #[must_use]
    pub fn failure_log(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(log) => Some(log),
        }
    }
}

/// Build-and-run collaborator for the target environment.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Build the environment from the manifest in `target_dir` and start it.
    async fn build_and_start(&self, target_dir: &Path) -> RunOutcome;

    /// Execute a generated test file against the app listening on `port`.
    async fn run_test(&self, test_file: &Path, port: u16) -> RunOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accessors() {
        assert!(RunOutcome::Success.is_success());
        assert!(RunOutcome::Success.failure_log().is_none());

        let failure = RunOutcome::Failure("boom".to_string());
        assert!(!failure.is_success());
        assert_eq!(failure.failure_log(), Some("boom"));
    }
}
