//! Agent System Controller
//!
//! Owns one instance of each agent per logical session and runs the
//! two-step pipeline: orchestrator classification, then dispatch to the
//! selected specialized agent with an enriched session context. Also
//! maintains the system-wide observability log and implements the
//! caller-layer quiz-selection resolution the tutor flow depends on.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use agent_core::{
    AgentError, AgentKind, AgentState, CompletionService, ConversationEntry, Outcome, QuizRecord,
    QuizStore, Result, RoutingDecision, SessionContext, StateListener, SystemLogEntry,
};

use crate::agent::Agent;
use crate::general::GeneralStudyAgent;
use crate::orchestrator::OrchestratorAgent;
use crate::quiz::QuizAgent;
use crate::tutor::TutorAgent;

/// How many completed quizzes the selection list shows
const RECENT_QUIZ_WINDOW: usize = 3;

/// Result of a full pipeline run, annotated with routing metadata
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedOutcome {
    /// The specialized agent's result
    pub outcome: Outcome,

    /// The routing decision that selected the agent
    pub routing: RoutingDecision,

    /// Snapshot of the system log after this turn
    pub system_log: Vec<SystemLogEntry>,
}

/// Aggregated status view across all agents
#[derive(Clone, Debug, Serialize)]
pub struct SystemStatus {
    /// Agent handling the most recent turn, if any
    pub current_agent: Option<AgentKind>,

    /// State of the current agent (Idle when none)
    pub system_state: AgentState,

    /// Per-agent states
    pub agent_states: Vec<(AgentKind, AgentState)>,

    /// All agents' conversation entries, oldest first
    pub conversation_log: Vec<ConversationEntry>,
}

/// Caller-layer resolution of a tutor quiz selection
#[derive(Clone, Debug)]
pub enum QuizSelection {
    /// Selection resolved to a concrete quiz
    Resolved(QuizRecord),

    /// No matching quiz; carries the user-visible correction
    NotFound { message: String },
}

/// One session's agents plus the shared pipeline
pub struct AgentSystem {
    orchestrator: OrchestratorAgent,
    quiz: QuizAgent,
    general: GeneralStudyAgent,
    tutor: TutorAgent,
    store: Option<Arc<dyn QuizStore>>,
    system_log: Vec<SystemLogEntry>,
    current_agent: Option<AgentKind>,
}

impl AgentSystem {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            orchestrator: OrchestratorAgent::new(completion.clone()),
            quiz: QuizAgent::new(completion.clone()),
            general: GeneralStudyAgent::new(completion.clone()),
            tutor: TutorAgent::new(completion),
            store: None,
            system_log: Vec::new(),
            current_agent: None,
        }
    }

    /// Attach the quiz datastore used for selection resolution
    pub fn with_store(mut self, store: Arc<dyn QuizStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register one listener for every agent's state transitions
    pub fn set_state_listener(&mut self, listener: StateListener) {
        self.orchestrator.core_mut().set_listener(listener.clone());
        self.quiz.core_mut().set_listener(listener.clone());
        self.general.core_mut().set_listener(listener.clone());
        self.tutor.core_mut().set_listener(listener);
    }

    fn log(&mut self, kind: &str, message: impl Into<String>) {
        self.system_log
            .push(SystemLogEntry::new(kind, message, self.current_agent));
    }

    /// Run the full pipeline on one input
    ///
    /// Within a session, callers must not start a second call before the
    /// first returns; the system keeps no internal queue.
    pub async fn process_input(
        &mut self,
        input: &str,
        ctx: &SessionContext,
    ) -> Result<ProcessedOutcome> {
        self.current_agent = Some(AgentKind::Orchestrator);
        self.log("input", format!("received: {}", input));

        let decision = match self.orchestrator.classify(input, ctx).await {
            Ok(decision) => decision,
            Err(err) => {
                self.log("error", format!("classification failed: {}", err));
                return Err(err);
            }
        };
        self.log(
            "routing",
            format!(
                "target={} confidence={:.2} reasoning={}",
                decision.target, decision.confidence, decision.reasoning
            ),
        );

        let enriched = ctx.enriched(&decision);
        self.current_agent = Some(decision.target);

        let result = match decision.target {
            AgentKind::Quiz => self.quiz.process(input, &enriched).await,
            AgentKind::General => self.general.process(input, &enriched).await,
            AgentKind::Tutor => self.tutor.process(input, &enriched).await,
            AgentKind::Orchestrator => {
                // Routing back to the router is an internal contract
                // violation, not a recoverable user-facing condition.
                Err(AgentError::UnknownAgent(decision.target.to_string()))
            }
        };

        match result {
            Ok(outcome) => {
                self.log("dispatch", format!("{} returned an outcome", decision.target));
                Ok(ProcessedOutcome {
                    outcome,
                    routing: decision,
                    system_log: self.system_log.clone(),
                })
            }
            Err(err) => {
                self.log("error", format!("{} failed: {}", decision.target, err));
                Err(err)
            }
        }
    }

    /// Aggregate status/log view across all agents
    pub fn system_status(&self) -> SystemStatus {
        let agent_states = vec![
            (AgentKind::Orchestrator, self.orchestrator.core().state()),
            (AgentKind::Quiz, self.quiz.state()),
            (AgentKind::General, self.general.state()),
            (AgentKind::Tutor, self.tutor.state()),
        ];

        let system_state = self
            .current_agent
            .and_then(|kind| {
                agent_states
                    .iter()
                    .find(|(k, _)| *k == kind)
                    .map(|(_, state)| *state)
            })
            .unwrap_or(AgentState::Idle);

        let mut conversation_log: Vec<ConversationEntry> = Vec::new();
        conversation_log.extend_from_slice(self.orchestrator.core().log().entries());
        conversation_log.extend_from_slice(self.quiz.core().log().entries());
        conversation_log.extend_from_slice(self.general.core().log().entries());
        conversation_log.extend_from_slice(self.tutor.core().log().entries());
        conversation_log.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        SystemStatus {
            current_agent: self.current_agent,
            system_state,
            agent_states,
            conversation_log,
        }
    }

    /// Reset every agent's context and log plus the system log
    pub fn clear_all_contexts(&mut self) {
        self.orchestrator.core_mut().clear();
        self.quiz.clear_context();
        self.general.clear_context();
        self.tutor.clear_context();
        self.system_log.clear();
        self.current_agent = None;
        tracing::info!("all agent contexts cleared");
    }

    /// Direct access to the tutor agent (flow inspection)
    pub fn tutor(&self) -> &TutorAgent {
        &self.tutor
    }

    /// Snapshot of the system log
    pub fn system_log(&self) -> &[SystemLogEntry] {
        &self.system_log
    }

    /// Resolve a tutor quiz selection against the datastore
    ///
    /// The selection list is the user's most recent 3 completed quizzes,
    /// newest first. An ordinal ("1".."3") indexes that list; anything
    /// else matches by quiz id or subject. Out-of-bounds ordinals yield a
    /// visible correction, never a silent no-op.
    pub fn resolve_quiz_selection(&self, user_id: &str, selection: &str) -> Result<QuizSelection> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| AgentError::Config("no quiz store configured".into()))?;

        let recent: Vec<QuizRecord> = store
            .user_quizzes(user_id)?
            .into_iter()
            .filter(|q| q.completed)
            .take(RECENT_QUIZ_WINDOW)
            .collect();

        let selection = selection.trim();
        if let Ok(ordinal) = selection.parse::<usize>() {
            return Ok(match ordinal.checked_sub(1).and_then(|i| recent.get(i)) {
                Some(quiz) => QuizSelection::Resolved(quiz.clone()),
                None => QuizSelection::NotFound {
                    message: format!(
                        "Quiz not found — choose a number between 1 and {}.",
                        recent.len().max(1)
                    ),
                },
            });
        }

        let matched = recent.iter().find(|q| {
            q.id == selection || q.subject.to_lowercase().contains(&selection.to_lowercase())
        });
        Ok(match matched {
            Some(quiz) => QuizSelection::Resolved(quiz.clone()),
            None => QuizSelection::NotFound {
                message: format!(
                    "I couldn't find a quiz matching \"{}\" among your recent attempts.",
                    selection
                ),
            },
        })
    }
}

/// Session-keyed ownership of agent systems
///
/// Replaces a process-wide mutable singleton: each session id maps to its
/// own `AgentSystem`, so unrelated users sharing a process never share
/// agent state. The per-session mutex serializes calls on a
/// multi-threaded runtime; callers still should not overlap calls within
/// one session.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<AgentSystem>>>>,
    completion: Arc<dyn CompletionService>,
    store: Option<Arc<dyn QuizStore>>,
}

impl SessionRegistry {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            completion,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn QuizStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The system for a session, created on first use
    pub fn get_or_create(&self, session_id: &str) -> Arc<tokio::sync::Mutex<AgentSystem>> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, "creating agent system");
                let mut system = AgentSystem::new(self.completion.clone());
                if let Some(store) = &self.store {
                    system = system.with_store(store.clone());
                }
                Arc::new(tokio::sync::Mutex::new(system))
            })
            .clone()
    }

    /// Run the pipeline for a session, creating it if needed
    pub async fn process_input(
        &self,
        session_id: &str,
        input: &str,
        ctx: &SessionContext,
    ) -> Result<ProcessedOutcome> {
        let system = self.get_or_create(session_id);
        let mut system = system.lock().await;
        system.process_input(input, ctx).await
    }

    /// Drop a session's agents and state
    pub fn evict(&self, session_id: &str) -> bool {
        self.sessions.lock().unwrap().remove(session_id).is_some()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
