//! Error types for the migration engine
//!
//! Two families, matching the propagation policy: dependency-resolution and
//! translation failures are fatal for the run; environment and test failures
//! are expected and repaired until the retry policy is exhausted.

use recast_fs::FsError;
use recast_llm::LlmError;

/// Phase of the test lifecycle a bounded repair loop belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Building and starting the target environment
    BuildEnv,
    /// Validating a generated test against the original app
    ValidateTest,
    /// Running a generated test against the migrated app
    RunTest,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::BuildEnv => "environment build",
            Self::ValidateTest => "test validation",
            Self::RunTest => "test run",
        };
        f.write_str(label)
    }
}

/// Engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Model collaborator failed
    #[error("model error: {0}")]
    Llm(#[from] LlmError),

    /// Filesystem operation failed
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    /// Test generation produced nothing runnable for a file
    #[error("test generation produced no files for {file}")]
    TestGeneration {
        /// Source file the test was requested for
        file: String,
    },

    /// A bounded repair loop ran out of attempts
    #[error("{phase} repair exhausted after {attempts} attempts")]
    RepairExhausted {
        /// Which lifecycle phase gave up
        phase: LifecyclePhase,
        /// Failures observed before giving up
        attempts: u32,
    },
}

impl EngineError {
    /// True for failures the outer state machine would have retried; once they
    /// surface here the retry budget is spent.
    #[inline]
    #[must_use]
    pub fn is_repair_exhausted(&self) -> bool {
        matches!(self, Self::RepairExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_exhausted_display_names_phase() {
        let err = EngineError::RepairExhausted {
            phase: LifecyclePhase::BuildEnv,
            attempts: 5,
        };
        assert_eq!(
            err.to_string(),
            "environment build repair exhausted after 5 attempts"
        );
        assert!(err.is_repair_exhausted());
    }

    #[test]
    fn llm_error_converts() {
        let err: EngineError = LlmError::EmptyCompletion.into();
        assert!(err.to_string().contains("model error"));
        assert!(!err.is_repair_exhausted());
    }
}
