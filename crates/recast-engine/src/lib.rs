//! Migration and test orchestration engine
//!
//! The engine drives a full codebase migration:
//! - Classifies each file's imports into internal and external dependencies
//!   through the model collaborator ([`resolver`])
//! - Walks the dependency tree depth-first, translating children before
//!   parents and never translating a file twice ([`orchestrator`])
//! - Persists translated files under the target root ([`writer`])
//! - Builds the target environment and runs generated tests to convergence
//!   under a bounded repair/retry policy ([`testing`], [`repair`])

pub mod container;
pub mod context;
pub mod depmap;
pub mod environment;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod prompts;
pub mod repair;
pub mod resolver;
pub mod testing;
pub mod writer;

pub use container::{ContainerRuntime, RunOutcome};
pub use context::MigrationContext;
pub use depmap::DependencyMap;
pub use environment::EnvironmentBuilder;
pub use error::{EngineError, LifecyclePhase};
pub use memory::{MemoryKind, MemoryStore};
pub use orchestrator::MigrationOrchestrator;
pub use repair::{RepairEngine, RetryPolicy};
pub use resolver::{DependencyRecord, DependencyResolver};
pub use testing::{TestFile, TestLifecycle, TestState};
pub use writer::TranslationWriter;
