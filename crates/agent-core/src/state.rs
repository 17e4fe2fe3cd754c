//! Agent Identity and State Machine
//!
//! Every agent exposes its lifecycle through a closed state enum. The
//! *sequence* of transitions is an observable contract: status displays
//! key off these exact labels, so transient sub-states (analyzing,
//! routing, thinking, generating, fetching_quizzes) are first-class
//! variants rather than ad-hoc strings.

use serde::{Deserialize, Serialize};

use crate::message::ConversationEntry;

/// Which specialized agent a value belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Entry agent that classifies input and selects a target
    Orchestrator,
    /// Quiz authoring via slot-filling
    Quiz,
    /// Open-ended study explanations
    General,
    /// Post-quiz performance review
    Tutor,
}

impl AgentKind {
    /// All dispatchable targets (everything except the orchestrator itself)
    pub fn targets() -> [AgentKind; 3] {
        [AgentKind::Quiz, AgentKind::General, AgentKind::Tutor]
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Orchestrator => write!(f, "orchestrator"),
            AgentKind::Quiz => write!(f, "quiz"),
            AgentKind::General => write!(f, "general"),
            AgentKind::Tutor => write!(f, "tutor"),
        }
    }
}

/// Agent lifecycle state
///
/// Canonical states plus the transient sub-states each agent traverses
/// mid-turn. Each agent only ever uses its own subset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Not currently handling a turn
    #[default]
    Idle,
    /// Ready and waiting for the next turn
    Listening,
    /// Turn accepted, work started
    Processing,
    /// Orchestrator: building/awaiting the classification completion
    Analyzing,
    /// Orchestrator: classification done, selecting the target
    Routing,
    /// General agent: awaiting the explanation completion
    Thinking,
    /// Quiz agent: all slots filled, building the final specification
    Generating,
    /// Tutor agent: awaiting the caller-layer quiz list read
    FetchingQuizzes,
    /// Slot-filling paused until the user supplies more information
    WaitingForInput,
    /// Turn finished successfully
    Completed,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AgentState::Idle => "idle",
            AgentState::Listening => "listening",
            AgentState::Processing => "processing",
            AgentState::Analyzing => "analyzing",
            AgentState::Routing => "routing",
            AgentState::Thinking => "thinking",
            AgentState::Generating => "generating",
            AgentState::FetchingQuizzes => "fetching_quizzes",
            AgentState::WaitingForInput => "waiting_for_input",
            AgentState::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

/// Callback invoked on every state transition
///
/// Receives the agent's kind, the new state, and a snapshot of its
/// conversation log. This is the only externally observable side channel
/// besides `process` return values.
pub type StateListener = std::sync::Arc<dyn Fn(AgentKind, AgentState, &[ConversationEntry]) + Send + Sync>;
