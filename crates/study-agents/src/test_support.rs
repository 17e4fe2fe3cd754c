//! Scripted completion service for tests
//!
//! Returns canned responses in order: valid JSON, malformed text, or
//! transport errors, so every fallback branch can be driven
//! deterministically.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agent_core::{AgentError, CompletionOptions, CompletionService, Result};

pub struct MockCompletion {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletion {
    pub fn with_responses(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the prompts the agents actually sent
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        self.prompts.clone()
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Completion("mock script exhausted".into())))
    }
}
