//! Conversation Messages and Logs
//!
//! Append-only per-agent conversation logs plus the system-wide
//! observability log kept by the controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::AgentKind;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Agent response
    Agent,
    /// Controller/system annotation
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
            Role::System => write!(f, "system"),
        }
    }
}

/// A single entry in an agent's conversation log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Who produced this entry
    pub role: Role,

    /// Text content
    pub message: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Optional structured metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Agent that owns the log this entry belongs to
    pub agent: AgentKind,
}

impl ConversationEntry {
    pub fn new(role: Role, message: impl Into<String>, agent: AgentKind) -> Self {
        Self {
            role,
            message: message.into(),
            timestamp: Utc::now(),
            metadata: None,
            agent,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Append-only conversation log, one per agent
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    /// Drop every entry (explicit reset only)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A prior message supplied by the caller as session history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// "user" or "assistant"
    pub role: String,

    /// Text content
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Entry in the controller's system-wide log
///
/// Distinct from per-agent conversation logs; used purely for
/// observability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemLogEntry {
    /// Event kind (e.g. "routing", "dispatch", "error")
    pub kind: String,

    /// Human-readable description
    pub message: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Agent active when the event was recorded
    pub current_agent: Option<AgentKind>,
}

impl SystemLogEntry {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        current_agent: Option<AgentKind>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            timestamp: Utc::now(),
            current_agent,
        }
    }
}
