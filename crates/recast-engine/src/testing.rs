//! Test lifecycle state machine
//!
//! `BUILD_ENV -> (per test file) GENERATE_TEST -> [VALIDATE_AGAINST_SOURCE]*
//! -> RUN_AGAINST_TARGET* -> DONE`. Each starred phase wraps a bounded
//! repair-and-retry loop: environment failures repair the application code
//! and rebuild; validation failures repair the test artifact itself. The run
//! finishes only when every requested test file passes against the target, or
//! a phase exhausts its retry budget.

use crate::container::ContainerRuntime;
use crate::context::MigrationContext;
use crate::error::{EngineError, LifecyclePhase};
use crate::prompts;
use crate::repair::{RepairEngine, RetryPolicy};
use crate::writer::persist_files;
use recast_fs::{build_directory_structure, read_to_string};
use recast_llm::LlmResponse;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Pause between validation retries against the original app.
const VALIDATE_PAUSE: Duration = Duration::from_millis(300);

/// Validation progress of one generated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestState {
    /// Generated, not yet executed anywhere
    Unvalidated,
    /// Confirmed well-formed against the original app
    SourceValidated,
    /// Passed against the migrated app
    Passing,
}

/// A generated test artifact tied to one source file.
#[derive(Debug, Clone, Serialize)]
pub struct TestFile {
    /// The source file the test exercises
    pub source_file: String,
    /// Where the generated test lives on disk
    pub path: PathBuf,
    /// Validation progress
    pub state: TestState,
}

/// Drives generate / validate / run / repair for every requested test file.
pub struct TestLifecycle<'a> {
    ctx: &'a MigrationContext,
    runtime: &'a dyn ContainerRuntime,
    policy: RetryPolicy,
}

impl<'a> TestLifecycle<'a> {
    /// Create a lifecycle over a context and container runtime.
    #[must_use]
    pub fn new(
        ctx: &'a MigrationContext,
        runtime: &'a dyn ContainerRuntime,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            ctx,
            runtime,
            policy,
        }
    }

    /// Run the full lifecycle. Returns the final state of every test file;
    /// on success all are [`TestState::Passing`].
    pub async fn run(&self) -> Result<Vec<TestFile>, EngineError> {
        self.build_environment().await?;

        let mut results = Vec::new();
        for source_file in &self.ctx.test_files {
            let mut test = self.generate_test(source_file).await?;

            if let Some(source_port) = self.ctx.source_port {
                self.validate_against_source(&mut test, source_port).await?;
            }

            self.run_against_target(&mut test).await?;
            results.push(test);
        }

        tracing::info!(tests = results.len(), "all test files passing");
        Ok(results)
    }

    /// BUILD_ENV: build/start the target environment, repairing the tree on
    /// failure until it comes up or the budget runs out.
    pub async fn build_environment(&self) -> Result<(), EngineError> {
        let repair = RepairEngine::new(self.ctx);
        let mut attempts = 0u32;
        loop {
            match self.runtime.build_and_start(&self.ctx.target_dir).await {
                outcome if outcome.is_success() => {
                    tracing::info!("target environment is up");
                    return Ok(());
                }
                outcome => {
                    let log = outcome.failure_log().unwrap_or_default().to_string();
                    attempts += 1;
                    tracing::warn!(attempts, "environment build failed");
                    if attempts >= self.policy.max_attempts {
                        return Err(EngineError::RepairExhausted {
                            phase: LifecyclePhase::BuildEnv,
                            attempts,
                        });
                    }
                    repair.repair_code(&log, &[]).await?;
                }
            }
        }
    }

    /// GENERATE_TEST: produce a test artifact exercising `source_file`'s
    /// externally visible behavior.
    async fn generate_test(&self, source_file: &str) -> Result<TestFile, EngineError> {
        let source_content = read_to_string(&self.ctx.source_path(source_file))?;
        let target_tree = build_directory_structure(&self.ctx.target_dir);
        let prompt = prompts::generate_test(self.ctx, source_file, &source_content, &target_tree);
        let completion = self.ctx.llm().complete(&prompt).await?;

        let files = match LlmResponse::parse(&completion) {
            LlmResponse::Files { files, .. } => files,
            LlmResponse::Instruction(text) => {
                tracing::info!(file = source_file, %text, "test generation returned guidance");
                Vec::new()
            }
        };
        let Some(first) = files.first() else {
            return Err(EngineError::TestGeneration {
                file: source_file.to_string(),
            });
        };

        let names = persist_files(self.ctx, &files)?;
        tracing::info!(file = source_file, test = %first.filename, "generated test file");
        Ok(TestFile {
            source_file: source_file.to_string(),
            path: self.ctx.target_path(&names[0]),
            state: TestState::Unvalidated,
        })
    }

    /// VALIDATE_AGAINST_SOURCE: confirm the test itself expresses correct
    /// expected behavior by running it against the original app.
    async fn validate_against_source(
        &self,
        test: &mut TestFile,
        source_port: u16,
    ) -> Result<(), EngineError> {
        let repair = RepairEngine::new(self.ctx);
        let mut attempts = 0u32;
        loop {
            match self.runtime.run_test(&test.path, source_port).await {
                outcome if outcome.is_success() => {
                    test.state = TestState::SourceValidated;
                    tracing::info!(test = %test.path.display(), "test validated against source app");
                    return Ok(());
                }
                outcome => {
                    let log = outcome.failure_log().unwrap_or_default().to_string();
                    attempts += 1;
                    tracing::warn!(attempts, test = %test.path.display(), "test validation failed");
                    if attempts >= self.policy.max_attempts {
                        return Err(EngineError::RepairExhausted {
                            phase: LifecyclePhase::ValidateTest,
                            attempts,
                        });
                    }
                    repair.repair_test(&log, &test.path).await?;
                    tokio::time::sleep(VALIDATE_PAUSE).await;
                }
            }
        }
    }

    /// RUN_AGAINST_TARGET: run the test against the migrated app, repairing
    /// the application code and rebuilding the environment between attempts.
    async fn run_against_target(&self, test: &mut TestFile) -> Result<(), EngineError> {
        let repair = RepairEngine::new(self.ctx);
        let mut attempts = 0u32;
        loop {
            match self.runtime.run_test(&test.path, self.ctx.target_port).await {
                outcome if outcome.is_success() => {
                    test.state = TestState::Passing;
                    tracing::info!(test = %test.path.display(), "test passed against target app");
                    return Ok(());
                }
                outcome => {
                    let log = outcome.failure_log().unwrap_or_default().to_string();
                    attempts += 1;
                    tracing::warn!(attempts, test = %test.path.display(), "test run failed");
                    if attempts >= self.policy.max_attempts {
                        return Err(EngineError::RepairExhausted {
                            phase: LifecyclePhase::RunTest,
                            attempts,
                        });
                    }
                    repair
                        .repair_code(&log, std::slice::from_ref(&test.source_file))
                        .await?;
                    // The repaired tree needs a fresh environment before re-probing.
                    let rebuild = self.runtime.build_and_start(&self.ctx.target_dir).await;
                    if !rebuild.is_success() {
                        tracing::warn!("environment rebuild after repair failed; retrying anyway");
                    }
                    tokio::time::sleep(self.policy.readiness_pause).await;
                }
            }
        }
    }
}
