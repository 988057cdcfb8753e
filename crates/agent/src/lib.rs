//! Triage runtime: turns one customer message into a classified, structured record.
//!
//! The completion backend is strictly an extractor. It labels the message and fills in
//! record fields; ticket ids, team assignment, severity, and the customer-facing
//! acknowledgement are decided here deterministically.
//!
//! - [`llm`] defines the completion seam ([`llm::CompletionClient`]) and a scripted
//!   in-memory client for tests.
//! - [`openai`] is the OpenAI-compatible HTTP transport, also used for Ollama.
//! - [`steps`] holds the classification and extraction steps with their fallbacks.
//! - [`runtime`] drives the steps through the core flow engine.

pub mod llm;
pub mod openai;
pub mod prompts;
pub mod runtime;
pub mod steps;

pub use llm::{CompletionClient, CompletionError, ScriptedCompletionClient};
pub use openai::OpenAiCompletionClient;
pub use runtime::TriageRuntime;
