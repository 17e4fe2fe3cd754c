//! Ollama Completion Backend
//!
//! Implementation of `CompletionService` for local Ollama inference.

use agent_core::{
    error::{AgentError, Result},
    provider::{CompletionOptions, CompletionService},
};
use async_trait::async_trait;
use ollama_rs::{
    generation::completion::request::GenerationRequest,
    models::ModelOptions as OllamaOptions,
    Ollama,
};

/// Ollama backend configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model identifier used for every completion
    pub model: String,

    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2".into(),
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost".into());
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(11434);
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".into());

        Self {
            host,
            port,
            model,
            ..Default::default()
        }
    }
}

/// Ollama-backed completion service
pub struct OllamaCompletion {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaCompletion {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(&config.host, config.port),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Create with default localhost settings
    pub fn localhost() -> Self {
        Self::from_config(OllamaConfig::default())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Map agent options onto Ollama generation options
    fn build_options(opts: &CompletionOptions) -> OllamaOptions {
        OllamaOptions::default()
            .temperature(opts.temperature)
            .top_k(opts.top_k)
            .top_p(opts.top_p)
            .num_predict(opts.max_output_tokens as i32)
    }
}

#[async_trait]
impl CompletionService for OllamaCompletion {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let request = GenerationRequest::new(self.config.model.clone(), prompt.to_string())
            .options(Self::build_options(options));

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| AgentError::Completion(e.to_string()))?;

        Ok(response.response)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
        assert_eq!(config.model, "llama3.2");
    }

    #[test]
    fn test_from_config_keeps_model() {
        let backend = OllamaCompletion::from_config(OllamaConfig {
            model: "qwen2.5".into(),
            ..Default::default()
        });
        assert_eq!(backend.model(), "qwen2.5");
    }
}
