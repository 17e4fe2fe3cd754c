//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Completion service error
    #[error("Completion error: {0}")]
    Completion(String),

    /// Completion service unavailable or not responding
    #[error("Completion service unavailable: {0}")]
    CompletionUnavailable(String),

    /// Empty input with no attachment to fall back on
    #[error("Input must be a non-empty string")]
    EmptyInput,

    /// Routing produced a target the controller cannot dispatch to
    #[error("Unknown target agent: {0}")]
    UnknownAgent(String),

    /// Datastore error
    #[error("Store error: {0}")]
    Store(String),

    /// Record not found in the datastore
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parse error (e.g. structured completion payloads)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited by the completion service
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::CompletionUnavailable(_)
                | AgentError::RateLimited(_)
                | AgentError::Io(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Completion(_) | AgentError::CompletionUnavailable(_) => {
                "Something went wrong on our side. Please try again.".into()
            }
            AgentError::EmptyInput => "Please type a message first.".into(),
            AgentError::RateLimited(_) => {
                "You've made too many requests. Please wait a moment.".into()
            }
            AgentError::Session(msg) => format!("Session problem: {}", msg),
            AgentError::NotFound(what) => format!("Couldn't find {}.", what),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
