//! Orchestrator Agent
//!
//! Entry agent: classifies a free-text request into one of the three
//! specialized agents via an LLM completion, extracting a structured
//! intent payload along the way.
//!
//! The keyword fallback below is the system's sole defense against an
//! unreliable upstream model. Its substring checks and their ordering are
//! a behavioral contract; tests and user-facing messaging depend on them.

use std::sync::Arc;

use agent_core::{
    provider::parse_structured, AgentKind, AgentState, CompletionOptions, CompletionService,
    ExtractedInfo, Result, RoutingDecision, SessionContext,
};

use crate::agent::{history_lines, AgentCore};

/// Fixed confidence reported by the keyword fallback
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

const CLASSIFY_PREAMBLE: &str = r#"You are the router for a study assistant. Classify the user's request into exactly one target agent:

- "quiz": the user wants a quiz created (authoring quizzes on a subject/topic, choosing question count, difficulty, or format)
- "general": the user wants an explanation, tutoring help, or an open-ended study question answered
- "tutor": the user wants a review of past quiz performance, improvement advice, or analysis of their results

Respond with ONLY a JSON object in this shape:
{
  "target": "quiz" | "general" | "tutor",
  "confidence": 0.0-1.0,
  "reasoning": "one sentence",
  "extracted": {
    "intent": string,
    "subject": string or null,
    "topic": string or null,
    "questionCount": number or null,
    "difficulty": string or null,
    "quizType": string or null,
    "needsMoreInfo": boolean,
    "missingInfo": [string]
  },
  "suggestedQuestions": [string]
}"#;

/// The entry agent that selects a target for each input
pub struct OrchestratorAgent {
    core: AgentCore,
    completion: Arc<dyn CompletionService>,
}

impl OrchestratorAgent {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            core: AgentCore::new(AgentKind::Orchestrator),
            completion,
        }
    }

    pub fn core(&self) -> &AgentCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    /// Classify one input into a routing decision
    ///
    /// State sequence: Processing → Analyzing → Routing → Completed.
    /// Malformed classification JSON falls back to keyword routing and is
    /// never surfaced; transport errors force Idle and propagate.
    ///
    /// Empty input is accepted when the turn carries an attachment, so
    /// attachment-only turns reach the agents that opt into them.
    pub async fn classify(
        &mut self,
        input: &str,
        ctx: &SessionContext,
    ) -> Result<RoutingDecision> {
        self.core.begin_turn(input, ctx, true)?;
        self.core.set_state(AgentState::Analyzing);

        let prompt = self.build_prompt(input, ctx);
        let raw = match self
            .completion
            .complete(&prompt, &CompletionOptions::structured())
            .await
        {
            Ok(text) => text,
            Err(err) => {
                self.core.set_state(AgentState::Idle);
                return Err(err);
            }
        };

        self.core.set_state(AgentState::Routing);

        let decision = match parse_structured::<RoutingDecision>(&raw) {
            Ok(decision) => decision.clamped(),
            Err(err) => {
                tracing::warn!(%err, "classification payload unusable, using keyword routing");
                route_by_keywords(input)
            }
        };

        self.core.log_reply(
            &format!(
                "routed to {} (confidence {:.2})",
                decision.target, decision.confidence
            ),
            Some(serde_json::to_value(&decision)?),
        );
        self.core.set_state(AgentState::Completed);
        Ok(decision)
    }

    fn build_prompt(&self, input: &str, ctx: &SessionContext) -> String {
        let recent = ctx.recent_history(3);
        let mut prompt = String::from(CLASSIFY_PREAMBLE);
        if !recent.is_empty() {
            prompt.push_str("\n\nRecent conversation:\n");
            prompt.push_str(&history_lines(recent));
        }
        prompt.push_str("\n\nUser request: ");
        prompt.push_str(input);
        prompt
    }
}

/// Deterministic keyword routing used when classification JSON is unusable
///
/// Always succeeds and always reports confidence 0.5. Ordering matters:
/// "quiz" wins over the tutor keywords.
pub fn route_by_keywords(input: &str) -> RoutingDecision {
    let lower = input.to_lowercase();

    let (target, reasoning) = if lower.contains("quiz") {
        (AgentKind::Quiz, "keyword match: quiz")
    } else if ["performance", "review", "improve", "analysis"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        (AgentKind::Tutor, "keyword match: performance review")
    } else {
        (AgentKind::General, "no routing keyword, defaulting to general study help")
    };

    RoutingDecision {
        target,
        confidence: FALLBACK_CONFIDENCE,
        reasoning: reasoning.into(),
        extracted: ExtractedInfo {
            intent: Some(format!("{}_request", target)),
            ..ExtractedInfo::default()
        },
        suggested_questions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockCompletion;
    use agent_core::AgentError;

    #[test]
    fn test_fallback_quiz_keyword() {
        let decision = route_by_keywords("Quiz me on something");
        assert_eq!(decision.target, AgentKind::Quiz);
        assert!((decision.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fallback_tutor_keywords() {
        for input in [
            "how was my performance",
            "review my results",
            "I want to improve",
            "give me an analysis",
        ] {
            assert_eq!(route_by_keywords(input).target, AgentKind::Tutor, "{input}");
        }
    }

    #[test]
    fn test_fallback_quiz_beats_tutor() {
        // "quiz" is checked before the tutor keywords
        let decision = route_by_keywords("review my quiz");
        assert_eq!(decision.target, AgentKind::Quiz);
    }

    #[test]
    fn test_fallback_default_general() {
        let decision = route_by_keywords("explain photosynthesis to me");
        assert_eq!(decision.target, AgentKind::General);
        assert!((decision.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_classify_parses_model_json() {
        let mock = MockCompletion::with_responses(vec![Ok(r#"```json
{"target": "quiz", "confidence": 0.93, "reasoning": "wants a quiz",
 "extracted": {"subject": "Biology", "topic": "Photosynthesis", "needsMoreInfo": false},
 "suggestedQuestions": []}
```"#
            .into())]);
        let mut agent = OrchestratorAgent::new(Arc::new(mock));

        let decision = agent
            .classify("Create a quiz on photosynthesis", &SessionContext::new())
            .await
            .unwrap();

        assert_eq!(decision.target, AgentKind::Quiz);
        assert_eq!(decision.extracted.subject.as_deref(), Some("Biology"));
        assert_eq!(agent.core().state(), AgentState::Completed);
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_garbage() {
        let mock = MockCompletion::with_responses(vec![Ok("I'm not JSON at all".into())]);
        let mut agent = OrchestratorAgent::new(Arc::new(mock));

        let decision = agent
            .classify("quiz me please", &SessionContext::new())
            .await
            .unwrap();

        assert_eq!(decision.target, AgentKind::Quiz);
        assert!((decision.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_classify_unknown_target_label_falls_back() {
        // Valid JSON naming an unknown agent fails enum parsing and lands
        // in keyword routing rather than crashing.
        let mock = MockCompletion::with_responses(vec![Ok(
            r#"{"target": "billing", "confidence": 1.0, "reasoning": "?"}"#.into(),
        )]);
        let mut agent = OrchestratorAgent::new(Arc::new(mock));

        let decision = agent
            .classify("review my performance", &SessionContext::new())
            .await
            .unwrap();
        assert_eq!(decision.target, AgentKind::Tutor);
    }

    #[tokio::test]
    async fn test_classify_accepts_attachment_only_turn() {
        let mock = MockCompletion::with_responses(vec![Ok("not json".into())]);
        let mut agent = OrchestratorAgent::new(Arc::new(mock));
        let mut ctx = SessionContext::new();
        ctx.attachment = Some(agent_core::AttachmentRef {
            name: "notes.pdf".into(),
            mime_type: Some("application/pdf".into()),
            reference: "blob-1".into(),
        });

        let decision = agent.classify("", &ctx).await.unwrap();
        assert_eq!(decision.target, AgentKind::General);

        let mut agent =
            OrchestratorAgent::new(Arc::new(MockCompletion::with_responses(vec![])));
        assert!(matches!(
            agent.classify("", &SessionContext::new()).await,
            Err(AgentError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_transport_error_resets_to_idle() {
        let mock = MockCompletion::with_responses(vec![Err(AgentError::CompletionUnavailable(
            "connection refused".into(),
        ))]);
        let mut agent = OrchestratorAgent::new(Arc::new(mock));

        let err = agent
            .classify("quiz me", &SessionContext::new())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(agent.core().state(), AgentState::Idle);
    }
}
