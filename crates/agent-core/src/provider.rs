//! Completion Service Abstraction
//!
//! Defines the interface to the hosted LLM. The core consumes this trait
//! only; concrete backends live in `agent-runtime`. Returned text carries
//! no structural guarantee — callers that expect JSON must run it through
//! `extract_json` and keep a deterministic fallback on hand.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Sampling options for a completion request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-k sampling cutoff
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f32 { 0.7 }
fn default_top_k() -> u32 { 40 }
fn default_top_p() -> f32 { 0.9 }
fn default_max_output_tokens() -> u32 { 2048 }

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl CompletionOptions {
    /// Low-temperature options for classification/extraction prompts
    pub fn structured() -> Self {
        Self {
            temperature: 0.2,
            ..Default::default()
        }
    }
}

/// Strategy trait for hosted LLM backends
///
/// The agents work exclusively through this interface.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send a prompt and return the raw completion text
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;

    /// Check if the backend is reachable and configured correctly
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Strip code fences and locate the outermost JSON object in raw text
///
/// Models routinely wrap JSON in ```json fences or pad it with prose.
/// Returns the candidate slice, or `None` when no object boundaries exist.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    // Prefer a fenced block when present
    let inner = if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        }
    } else {
        trimmed
    };

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    if end < start {
        return None;
    }
    Some(inner[start..=end].trim())
}

/// Parse a structured payload out of untrusted completion text
///
/// Fence-strips, locates the object, then deserializes. Errors from this
/// function are the recoverable class: every caller defines a local
/// fallback instead of propagating.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T> {
    let candidate = extract_json(text)
        .ok_or_else(|| AgentError::Parse("no JSON object in completion".into()))?;
    serde_json::from_str(candidate).map_err(AgentError::from)
}
