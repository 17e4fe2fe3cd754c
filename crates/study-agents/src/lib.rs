//! # study-agents
//!
//! The orchestration core of the study assistant: a small state machine
//! that classifies free-text requests via an LLM completion, dispatches to
//! a specialized agent that may take multiple turns to collect what it
//! needs, and tolerates malformed model output without ever crashing the
//! conversation.
//!
//! ## Pipeline
//!
//! ```text
//! caller ──▶ AgentSystem::process_input
//!              │
//!              ├─▶ OrchestratorAgent::classify ──▶ RoutingDecision
//!              │
//!              └─▶ QuizAgent | GeneralStudyAgent | TutorAgent ::process
//!                        │
//!                        └─▶ Outcome (+ routing metadata, system log)
//! ```
//!
//! Every agent that expects structured model output carries a
//! deterministic keyword fallback; those fallbacks are behavioral
//! contracts, not best-effort error handling.

pub mod agent;
pub mod catalog;
pub mod general;
pub mod orchestrator;
pub mod quiz;
pub mod system;
pub mod tutor;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{Agent, AgentCore};
pub use general::GeneralStudyAgent;
pub use orchestrator::{route_by_keywords, OrchestratorAgent, FALLBACK_CONFIDENCE};
pub use quiz::QuizAgent;
pub use system::{AgentSystem, ProcessedOutcome, QuizSelection, SessionRegistry, SystemStatus};
pub use tutor::{classify_by_keywords, TutorAgent, TutorIntent, TutorStep};
