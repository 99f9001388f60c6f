//! Retry, repair and exhaustion behavior of the test lifecycle.

use pretty_assertions::assert_eq;
use recast_engine::{
    EngineError, LifecyclePhase, MigrationContext, RetryPolicy, RunOutcome, TestLifecycle,
    TestState,
};
use recast_test_utils::{code_reply, write_source_tree, ScriptedLlm, ScriptedRuntime};
use std::sync::Arc;
use std::time::Duration;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        readiness_pause: Duration::ZERO,
    }
}

fn context(
    source: &std::path::Path,
    target: &std::path::Path,
    llm: Arc<ScriptedLlm>,
) -> MigrationContext {
    MigrationContext::new(source, target, llm)
        .with_languages("python", "nodejs")
        .with_test_files(vec!["app.py".to_string()])
}

fn test_gen_llm() -> ScriptedLlm {
    ScriptedLlm::new().on(
        &["Write tests exercising", "app.py"],
        &code_reply("test_app.py", "python", "import sys; sys.exit(0)"),
    )
}

#[tokio::test]
async fn passing_run_needs_one_build_and_one_test() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path(), &[("app.py", "print('hi')")]);

    let llm = Arc::new(test_gen_llm());
    let ctx = context(source.path(), target.path(), llm);
    let runtime = ScriptedRuntime::new();

    let results = TestLifecycle::new(&ctx, &runtime, fast_policy(10))
        .run()
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].state, TestState::Passing);
    assert!(target.path().join("test_app.py").exists());
    assert_eq!(runtime.build_calls(), 1);
    assert_eq!(runtime.test_calls(), 1);
}

#[tokio::test]
async fn each_test_failure_triggers_exactly_one_repair_and_rebuild() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path(), &[("app.py", "print('hi')")]);

    let llm = Arc::new(test_gen_llm().on(
        &["Fix the migrated"],
        &code_reply("app.js", "javascript", "// patched"),
    ));
    let ctx = context(source.path(), target.path(), llm.clone());
    let runtime = ScriptedRuntime::failing_tests(2);

    let results = TestLifecycle::new(&ctx, &runtime, fast_policy(10))
        .run()
        .await
        .unwrap();

    assert_eq!(results[0].state, TestState::Passing);
    // Two failed runs, then the passing one.
    assert_eq!(runtime.test_calls(), 3);
    // Initial environment build plus one rebuild per repair.
    assert_eq!(runtime.build_calls(), 3);
    assert_eq!(llm.calls_matching(&["Fix the migrated"]), 2);
}

#[tokio::test]
async fn run_phase_exhaustion_reports_phase_and_attempts() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path(), &[("app.py", "print('hi')")]);

    let llm = Arc::new(test_gen_llm().on(
        &["Fix the migrated"],
        &code_reply("app.js", "javascript", "// patched"),
    ));
    let ctx = context(source.path(), target.path(), llm.clone());
    let runtime = ScriptedRuntime::failing_tests(10);

    let err = TestLifecycle::new(&ctx, &runtime, fast_policy(3))
        .run()
        .await
        .unwrap_err();

    assert!(err.is_repair_exhausted());
    match err {
        EngineError::RepairExhausted { phase, attempts } => {
            assert_eq!(phase, LifecyclePhase::RunTest);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The budget bounds the runs; only the first two failures were repaired.
    assert_eq!(runtime.test_calls(), 3);
    assert_eq!(llm.calls_matching(&["Fix the migrated"]), 2);
}

#[tokio::test]
async fn failed_environment_build_is_repaired_then_retried() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path(), &[("app.py", "print('hi')")]);

    let llm = Arc::new(test_gen_llm().on(
        &["Fix the migrated"],
        &code_reply("Dockerfile", "dockerfile", "FROM node:20"),
    ));
    let ctx = context(source.path(), target.path(), llm.clone());
    let runtime = ScriptedRuntime::new().with_build_script(vec![
        RunOutcome::Failure("missing base image".to_string()),
        RunOutcome::Success,
    ]);

    let results = TestLifecycle::new(&ctx, &runtime, fast_policy(10))
        .run()
        .await
        .unwrap();

    assert_eq!(results[0].state, TestState::Passing);
    assert_eq!(runtime.build_calls(), 2);
    assert_eq!(llm.calls_matching(&["Fix the migrated"]), 1);
    assert!(target.path().join("Dockerfile").exists());
}

#[tokio::test]
async fn failed_validation_repairs_the_test_not_the_app() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path(), &[("app.py", "print('hi')")]);

    let llm = Arc::new(test_gen_llm().on(
        &["Fix the generated test file"],
        &code_reply("test_app.py", "python", "import sys; sys.exit(0) # fixed"),
    ));
    let ctx = context(source.path(), target.path(), llm.clone()).with_ports(Some(5001), 8080);
    let runtime = ScriptedRuntime::new()
        .with_test_script(vec![RunOutcome::Failure("bad expectation".to_string())]);

    let results = TestLifecycle::new(&ctx, &runtime, fast_policy(10))
        .run()
        .await
        .unwrap();

    assert_eq!(results[0].state, TestState::Passing);
    // Failed validation, passing validation retry, passing target run.
    assert_eq!(runtime.test_calls(), 3);
    assert_eq!(llm.calls_matching(&["Fix the generated test file"]), 1);
    assert_eq!(llm.calls_matching(&["Fix the migrated"]), 0);
}

#[tokio::test]
async fn unparseable_generation_reply_is_a_hard_error() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_source_tree(source.path(), &[("app.py", "print('hi')")]);

    // Default reply carries no fenced code block, so no test can be written.
    let llm = Arc::new(ScriptedLlm::new().with_default("cannot help with that"));
    let ctx = context(source.path(), target.path(), llm);
    let runtime = ScriptedRuntime::new();

    let err = TestLifecycle::new(&ctx, &runtime, fast_policy(10))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::TestGeneration { file } if file == "app.py"));
}
