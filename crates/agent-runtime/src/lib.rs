//! # agent-runtime
//!
//! Completion-service backends for the study agent system. Currently
//! ships a local Ollama integration; additional hosted providers slot in
//! behind the same `CompletionService` trait.

#[cfg(feature = "ollama")]
mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaCompletion, OllamaConfig};
