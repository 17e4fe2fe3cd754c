//! General Study Agent
//!
//! Single-turn explanation/help agent. Stateless per call aside from
//! logging: the model's raw prose is the payload, so there is no JSON
//! contract and no fallback — transport errors force Idle and propagate.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    AgentKind, AgentState, CompletionOptions, CompletionService, Outcome, Result, SessionContext,
};

use crate::agent::{history_lines, Agent, AgentCore};

const STUDY_STYLE: &str = r#"You are a patient study tutor. Follow these directives:
- Explain concepts step by step, starting from what the student likely knows.
- Use one concrete example or analogy per concept.
- Keep paragraphs short; prefer plain language over jargon.
- End with a single check-your-understanding question."#;

/// How much prior conversation the explanation prompt carries
const HISTORY_WINDOW: usize = 10;

/// Open-ended tutoring explanation agent
pub struct GeneralStudyAgent {
    core: AgentCore,
    completion: Arc<dyn CompletionService>,
}

impl GeneralStudyAgent {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            core: AgentCore::new(AgentKind::General),
            completion,
        }
    }

    fn build_prompt(&self, input: &str, ctx: &SessionContext) -> String {
        let recent = ctx.recent_history(HISTORY_WINDOW);
        let mut prompt = String::from(STUDY_STYLE);
        if !recent.is_empty() {
            prompt.push_str("\n\nConversation so far:\n");
            prompt.push_str(&history_lines(recent));
        }
        prompt.push_str("\n\nStudent: ");
        prompt.push_str(input);
        prompt
    }
}

#[async_trait]
impl Agent for GeneralStudyAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn accepts_attachment_only(&self) -> bool {
        true
    }

    async fn process(&mut self, input: &str, ctx: &SessionContext) -> Result<Outcome> {
        self.core.begin_turn(input, ctx, self.accepts_attachment_only())?;
        self.core.set_state(AgentState::Thinking);

        let prompt = self.build_prompt(input, ctx);
        let text = match self
            .completion
            .complete(&prompt, &CompletionOptions::default())
            .await
        {
            Ok(text) => text,
            Err(err) => {
                self.core.set_state(AgentState::Idle);
                return Err(err);
            }
        };

        let outcome = Outcome::StudyResponse {
            agent: AgentKind::General,
            message: text,
        };
        self.core.finish_turn(&outcome, AgentState::Completed);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockCompletion;
    use agent_core::{AgentError, HistoryMessage};

    #[tokio::test]
    async fn test_returns_completion_verbatim() {
        let mock = MockCompletion::with_responses(vec![Ok(
            "Photosynthesis turns light into sugar. Quick check: where does the CO2 enter?"
                .into(),
        )]);
        let mut agent = GeneralStudyAgent::new(Arc::new(mock));

        let outcome = agent
            .process("explain photosynthesis", &SessionContext::new())
            .await
            .unwrap();

        match outcome {
            Outcome::StudyResponse { agent: kind, message } => {
                assert_eq!(kind, AgentKind::General);
                assert!(message.starts_with("Photosynthesis"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(agent.state(), AgentState::Completed);
    }

    #[tokio::test]
    async fn test_prompt_windows_history_to_ten() {
        let mock = MockCompletion::with_responses(vec![Ok("ok".into())]);
        let recorder = mock.prompts();
        let mut agent = GeneralStudyAgent::new(Arc::new(mock));

        let history = (0..15)
            .map(|i| HistoryMessage::new("user", format!("msg-{}", i)))
            .collect();
        let ctx = SessionContext::new().with_history(history);
        agent.process("help", &ctx).await.unwrap();

        let prompt = recorder.lock().unwrap().pop().unwrap();
        assert!(!prompt.contains("msg-4"));
        assert!(prompt.contains("msg-5"));
        assert!(prompt.contains("msg-14"));
    }

    #[tokio::test]
    async fn test_transport_error_resets_to_idle() {
        let mock = MockCompletion::with_responses(vec![Err(AgentError::Completion(
            "timeout".into(),
        ))]);
        let mut agent = GeneralStudyAgent::new(Arc::new(mock));

        assert!(agent.process("help", &SessionContext::new()).await.is_err());
        assert_eq!(agent.state(), AgentState::Idle);
    }
}
