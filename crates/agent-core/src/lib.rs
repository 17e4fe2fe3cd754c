//! # agent-core
//!
//! Framework types for the study agent system: agent state machine,
//! conversation logs, slot context, tagged outcomes, routing decisions,
//! and the interfaces to the two external collaborators (completion
//! service and quiz datastore).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      AgentSystem (study-agents)              │
//! │  ┌──────────────┐   ┌─────────────────────────────────────┐  │
//! │  │ Orchestrator │──▶│ Quiz / General / Tutor agents       │  │
//! │  └──────────────┘   └─────────────────────────────────────┘  │
//! │          │                         │                         │
//! │  CompletionService trait    QuizStore trait                  │
//! │  (agent-runtime impl)       (caller-owned persistence)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `CompletionService` trait enables swapping LLM backends without
//! changing agent logic; its output is always treated as untrusted.

pub mod context;
pub mod error;
pub mod message;
pub mod outcome;
pub mod provider;
pub mod routing;
pub mod state;
pub mod store;

pub use context::{AgentContext, AttachmentRef, SessionContext};
pub use error::{AgentError, Result};
pub use message::{ConversationEntry, ConversationLog, HistoryMessage, Role, SystemLogEntry};
pub use outcome::{Outcome, QuizSpec, TutorResponseKind};
pub use provider::{CompletionOptions, CompletionService};
pub use routing::{ExtractedInfo, RoutingDecision};
pub use state::{AgentKind, AgentState, StateListener};
pub use store::{MemoryQuizStore, QuizRecord, QuizStore, ReviewRecord};
