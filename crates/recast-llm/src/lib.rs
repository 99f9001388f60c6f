//! Language-model collaborator interface for recast
//!
//! The orchestration engine never talks to a model provider directly; it goes
//! through the [`LlmClient`] trait and interprets completions through the
//! tagged response grammar in [`response`].

pub mod client;
pub mod response;

pub use client::{LlmClient, LlmConfig, LlmError};
pub use response::{GeneratedFile, LlmResponse, INSTRUCTION_MARKER};
