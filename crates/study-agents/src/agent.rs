//! Agent Base
//!
//! Shared turn-handling discipline for every agent: state transitions fire
//! the registered listener, inputs and results land on the append-only
//! conversation log, and `clear` resets context + log without touching
//! state.

use async_trait::async_trait;

use agent_core::{
    AgentContext, AgentError, AgentKind, AgentState, ConversationEntry, ConversationLog, Outcome,
    Result, Role, SessionContext, StateListener,
};

/// State, context, and log shared by all agents
pub struct AgentCore {
    kind: AgentKind,
    state: AgentState,
    context: AgentContext,
    log: ConversationLog,
    listener: Option<StateListener>,
}

impl AgentCore {
    pub fn new(kind: AgentKind) -> Self {
        Self {
            kind,
            state: AgentState::Idle,
            context: AgentContext::new(),
            log: ConversationLog::new(),
            listener: None,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Register the transition listener (one per agent)
    pub fn set_listener(&mut self, listener: StateListener) {
        self.listener = Some(listener);
    }

    /// Transition state and notify the listener
    pub fn set_state(&mut self, state: AgentState) {
        self.state = state;
        tracing::debug!(agent = %self.kind, state = %state, "state transition");
        if let Some(listener) = &self.listener {
            listener(self.kind, state, self.log.entries());
        }
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AgentContext {
        &mut self.context
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Validate and record the incoming turn, entering Processing
    ///
    /// Empty input is rejected unless the caller attached a file and the
    /// agent opted into attachment-only turns.
    pub fn begin_turn(
        &mut self,
        input: &str,
        ctx: &SessionContext,
        accepts_attachment_only: bool,
    ) -> Result<()> {
        if input.trim().is_empty() && !(accepts_attachment_only && ctx.attachment.is_some()) {
            return Err(AgentError::EmptyInput);
        }
        self.set_state(AgentState::Processing);
        self.log
            .push(ConversationEntry::new(Role::User, input, self.kind));
        Ok(())
    }

    /// Record the agent's reply on the log
    pub fn log_reply(&mut self, message: &str, metadata: Option<serde_json::Value>) {
        let mut entry = ConversationEntry::new(Role::Agent, message, self.kind);
        if let Some(metadata) = metadata {
            entry = entry.with_metadata(metadata);
        }
        self.log.push(entry);
    }

    /// Record the outcome and finish the turn in the given state
    pub fn finish_turn(&mut self, outcome: &Outcome, final_state: AgentState) {
        self.log_reply(outcome.message(), None);
        self.set_state(final_state);
    }

    /// Reset context and conversation log; state is left unchanged
    pub fn clear(&mut self) {
        self.context.clear();
        self.log.clear();
    }
}

/// Contract implemented by the three specialized agents
///
/// The orchestrator shares `AgentCore` but returns a `RoutingDecision`
/// instead of an `Outcome`, so it lives outside this trait.
#[async_trait]
pub trait Agent: Send {
    fn core(&self) -> &AgentCore;

    fn core_mut(&mut self) -> &mut AgentCore;

    fn kind(&self) -> AgentKind {
        self.core().kind()
    }

    fn state(&self) -> AgentState {
        self.core().state()
    }

    /// Whether an empty input plus an attachment counts as a valid turn
    fn accepts_attachment_only(&self) -> bool {
        false
    }

    /// Handle one conversational turn
    async fn process(&mut self, input: &str, ctx: &SessionContext) -> Result<Outcome>;

    /// Reset accumulated context and conversation log
    fn clear_context(&mut self) {
        self.core_mut().clear();
    }
}

/// Render history messages as prompt lines, most recent last
pub(crate) fn history_lines(history: &[agent_core::HistoryMessage]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_begin_turn_rejects_empty_input() {
        let mut core = AgentCore::new(AgentKind::General);
        let ctx = SessionContext::new();

        assert!(matches!(
            core.begin_turn("   ", &ctx, false),
            Err(AgentError::EmptyInput)
        ));
        assert!(core.begin_turn("hello", &ctx, false).is_ok());
        assert_eq!(core.state(), AgentState::Processing);
        assert_eq!(core.log().len(), 1);
    }

    #[test]
    fn test_attachment_only_turn() {
        let mut core = AgentCore::new(AgentKind::Quiz);
        let mut ctx = SessionContext::new();
        ctx.attachment = Some(agent_core::AttachmentRef {
            name: "notes.pdf".into(),
            mime_type: Some("application/pdf".into()),
            reference: "blob-1".into(),
        });

        assert!(core.begin_turn("", &ctx, true).is_ok());
        assert!(core.begin_turn("", &ctx, false).is_err());
    }

    #[test]
    fn test_listener_sees_transitions() {
        let seen: Arc<Mutex<Vec<AgentState>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut core = AgentCore::new(AgentKind::Tutor);
        core.set_listener(Arc::new(move |_, state, _| {
            seen_clone.lock().unwrap().push(state);
        }));

        core.set_state(AgentState::Processing);
        core.set_state(AgentState::FetchingQuizzes);
        core.set_state(AgentState::Completed);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AgentState::Processing,
                AgentState::FetchingQuizzes,
                AgentState::Completed
            ]
        );
    }

    #[test]
    fn test_clear_leaves_state() {
        let mut core = AgentCore::new(AgentKind::Quiz);
        core.context_mut().set("subject", serde_json::json!("Biology"));
        core.set_state(AgentState::WaitingForInput);
        core.clear();

        assert!(core.context().is_empty());
        assert!(core.log().is_empty());
        assert_eq!(core.state(), AgentState::WaitingForInput);
    }
}
