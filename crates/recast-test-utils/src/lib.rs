//! Testing utilities for the recast workspace
//!
//! Deterministic collaborator doubles: a scripted model client and a scripted
//! container runtime, plus small on-disk fixture helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use recast_engine::{ContainerRuntime, RunOutcome};
use recast_llm::{LlmClient, LlmConfig, LlmError};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic model client: the first rule whose keys all appear in the
/// prompt wins; otherwise the default reply. Every prompt is recorded.
pub struct ScriptedLlm {
    config: LlmConfig,
    rules: Vec<Rule>,
    default_reply: String,
    prompts: Mutex<Vec<String>>,
}

struct Rule {
    keys: Vec<String>,
    reply: String,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default(),
            rules: Vec::new(),
            default_reply: "NONE".to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `reply` when every key appears in the prompt.
    pub fn on(mut self, keys: &[&str], reply: &str) -> Self {
        self.rules.push(Rule {
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
            reply: reply.to_string(),
        });
        self
    }

    pub fn with_default(mut self, reply: &str) -> Self {
        self.default_reply = reply.to_string();
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Number of recorded prompts containing every given key.
    pub fn calls_matching(&self, keys: &[&str]) -> usize {
        self.prompts
            .lock()
            .iter()
            .filter(|p| keys.iter().all(|k| p.contains(k)))
            .count()
    }
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().push(prompt.to_string());
        let reply = self
            .rules
            .iter()
            .find(|rule| rule.keys.iter().all(|k| prompt.contains(k.as_str())))
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(reply)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

/// Scripted container runtime: outcomes are popped from per-operation queues;
/// an empty queue means success. Calls are counted.
pub struct ScriptedRuntime {
    build_script: Mutex<VecDeque<RunOutcome>>,
    test_script: Mutex<VecDeque<RunOutcome>>,
    build_calls: AtomicUsize,
    test_calls: AtomicUsize,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self {
            build_script: Mutex::new(VecDeque::new()),
            test_script: Mutex::new(VecDeque::new()),
            build_calls: AtomicUsize::new(0),
            test_calls: AtomicUsize::new(0),
        }
    }

    /// Queue build outcomes, consumed in order.
    pub fn with_build_script(self, outcomes: Vec<RunOutcome>) -> Self {
        *self.build_script.lock() = outcomes.into();
        self
    }

    /// Queue test outcomes, consumed in order.
    pub fn with_test_script(self, outcomes: Vec<RunOutcome>) -> Self {
        *self.test_script.lock() = outcomes.into();
        self
    }

    /// Shorthand: `n` failures, then success forever.
    pub fn failing_tests(n: usize) -> Self {
        Self::new().with_test_script(
            (0..n)
                .map(|i| RunOutcome::Failure(format!("failure {i}")))
                .collect(),
        )
    }

    pub fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }

    pub fn test_calls(&self) -> usize {
        self.test_calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn build_and_start(&self, _target_dir: &Path) -> RunOutcome {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        self.build_script
            .lock()
            .pop_front()
            .unwrap_or(RunOutcome::Success)
    }

    async fn run_test(&self, _test_file: &Path, _port: u16) -> RunOutcome {
        self.test_calls.fetch_add(1, Ordering::SeqCst);
        self.test_script
            .lock()
            .pop_front()
            .unwrap_or(RunOutcome::Success)
    }
}

/// Write a source-tree fixture: `(relative path, content)` pairs.
pub fn write_source_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// A translation reply producing one file.
pub fn code_reply(filename: &str, language: &str, content: &str) -> String {
    format!("{filename}\n```{language}\n{content}\n```")
}
