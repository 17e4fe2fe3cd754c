//! Slot Context and Session Context
//!
//! `AgentContext` is the per-agent slot map accumulated across turns.
//! `SessionContext` is caller-supplied and read-mostly: the core never
//! mutates it, it only derives enriched copies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::HistoryMessage;
use crate::routing::{ExtractedInfo, RoutingDecision};

/// Mutable slot map an agent accumulates across turns
///
/// Merging is shallow and additive: new values overwrite old ones under
/// the same key, unrelated keys are kept. Values are never dropped except
/// by overwrite or an explicit reset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentContext {
    slots: HashMap<String, Value>,
}

impl AgentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single slot
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.slots.insert(key.into(), value);
    }

    /// Get a slot value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key)
    }

    /// Get a slot as a string, if present and textual
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(Value::as_str)
    }

    /// Get a slot as u32, tolerating numeric strings
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        match self.slots.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Shallow additive merge of newly extracted slot values
    pub fn merge(&mut self, extracted: &HashMap<String, Value>) {
        for (key, value) in extracted {
            if value.is_null() {
                continue;
            }
            self.slots.insert(key.clone(), value.clone());
        }
    }

    /// Reset to empty (explicit reset only)
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Borrow the underlying map (for prompt building)
    pub fn slots(&self) -> &HashMap<String, Value> {
        &self.slots
    }
}

impl From<&ExtractedInfo> for HashMap<String, Value> {
    fn from(info: &ExtractedInfo) -> Self {
        let mut map = HashMap::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };
        put("intent", info.intent.clone().map(Value::String));
        put("subject", info.subject.clone().map(Value::String));
        put("topic", info.topic.clone().map(Value::String));
        put("questionCount", info.question_count.map(Value::from));
        put("difficulty", info.difficulty.clone().map(Value::String));
        put("quizType", info.quiz_type.clone().map(Value::String));
        map
    }
}

/// Descriptor for an uploaded file the user attached to a turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// File name as uploaded
    pub name: String,

    /// MIME type, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Opaque storage reference
    pub reference: String,
}

/// Caller-supplied session state (read-mostly)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionContext {
    /// Prior message history, oldest first
    #[serde(default)]
    pub history: Vec<HistoryMessage>,

    /// Session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Authenticated user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Optional file attachment for this turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,

    /// Caller mode flags (e.g. voice mode)
    #[serde(default)]
    pub flags: HashMap<String, bool>,

    /// Routing metadata merged in by the controller (never caller-set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestrator_info: Option<ExtractedInfo>,

    /// Summary of the routing decision that selected the current agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingDecision>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.history = history;
        self
    }

    /// Last `n` history messages, oldest first
    pub fn recent_history(&self, n: usize) -> &[HistoryMessage] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Derive an enriched copy carrying routing metadata
    ///
    /// The original context is left untouched; specialized agents receive
    /// the copy.
    pub fn enriched(&self, decision: &RoutingDecision) -> Self {
        let mut enriched = self.clone();
        enriched.orchestrator_info = Some(decision.extracted.clone());
        enriched.routing = Some(decision.clone());
        enriched
    }
}
