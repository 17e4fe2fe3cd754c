//! Quiz Agent
//!
//! Slot-fills quiz parameters across turns, then emits a finalized quiz
//! specification. Slot extraction is delegated to the completion service;
//! a malformed extraction payload degrades to a canned clarification so
//! the conversation always moves forward.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use agent_core::{
    provider::parse_structured, AgentKind, AgentState, CompletionOptions, CompletionService,
    Outcome, QuizSpec, Result, SessionContext,
};

use crate::agent::{history_lines, Agent, AgentCore};
use crate::catalog;

const EXTRACT_PREAMBLE: &str = r#"You are collecting parameters for a study quiz. Slots:
- subject (required)
- topic (optional, narrows the subject)
- questionCount (required, default 5)
- difficulty (easy | medium | hard, default medium)
- quizType (multiple_choice | open_ended | mixed, default mixed)

Given what is already known and the user's latest message, respond with ONLY a JSON object:
{
  "needsMoreInfo": boolean,
  "extractedInfo": { "subject": ..., "topic": ..., "questionCount": ..., "difficulty": ..., "quizType": ... },
  "missingInfo": [names of required slots still missing],
  "message": "what to say to the user",
  "suggestedQuestions": [clarifying questions],
  "topicSuggestions": [topics the user might pick]
}
Set needsMoreInfo to true only when a required slot cannot be resolved."#;

/// Slot-extraction payload requested from the completion service
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SlotExtraction {
    needs_more_info: bool,
    extracted_info: HashMap<String, Value>,
    missing_info: Vec<String>,
    message: String,
    suggested_questions: Vec<String>,
    topic_suggestions: Vec<String>,
}

/// Quiz authoring agent
pub struct QuizAgent {
    core: AgentCore,
    completion: Arc<dyn CompletionService>,
}

impl QuizAgent {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            core: AgentCore::new(AgentKind::Quiz),
            completion,
        }
    }

    fn build_prompt(&self, input: &str, ctx: &SessionContext) -> String {
        let mut prompt = String::from(EXTRACT_PREAMBLE);

        if !self.core.context().is_empty() {
            prompt.push_str("\n\nAlready known:\n");
            for (key, value) in self.core.context().slots() {
                prompt.push_str(&format!("- {}: {}\n", key, value));
            }
        }

        let recent = ctx.recent_history(3);
        if !recent.is_empty() {
            prompt.push_str("\nRecent conversation:\n");
            prompt.push_str(&history_lines(recent));
        }

        prompt.push_str("\n\nUser: ");
        prompt.push_str(input);
        prompt
    }

    /// Canned clarification used when the extraction payload is unusable
    fn fallback_extraction() -> SlotExtraction {
        SlotExtraction {
            needs_more_info: true,
            extracted_info: HashMap::new(),
            missing_info: vec!["subject".into()],
            message: format!(
                "I'd love to build you a quiz! What subject should it cover? For example:\n{}",
                catalog::example_lines().join("\n")
            ),
            suggested_questions: vec![
                "What subject would you like to be quizzed on?".into(),
                "Is there a specific topic within that subject?".into(),
            ],
            topic_suggestions: catalog::subjects().iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Build the finalized specification from accumulated context
    ///
    /// Missing or non-numeric counts fall back to the documented defaults.
    fn finalize_spec(&self) -> QuizSpec {
        let ctx = self.core.context();
        QuizSpec {
            subject: ctx.get_str("subject").unwrap_or("General Knowledge").to_string(),
            topic: ctx.get_str("topic").map(str::to_string),
            question_count: ctx
                .get_u32("questionCount")
                .unwrap_or(QuizSpec::DEFAULT_QUESTION_COUNT),
            difficulty: ctx
                .get_str("difficulty")
                .unwrap_or(QuizSpec::DEFAULT_DIFFICULTY)
                .to_string(),
            quiz_type: ctx
                .get_str("quizType")
                .unwrap_or(QuizSpec::DEFAULT_QUIZ_TYPE)
                .to_string(),
        }
    }
}

/// Up to 4 follow-up suggestions for a freshly generated quiz
///
/// Difficulty progression first, then at most 2 related topics (never the
/// topic just quizzed), a format variation, and a standing tutor offer.
pub fn next_suggestions(spec: &QuizSpec) -> Vec<String> {
    let mut suggestions = Vec::new();

    suggestions.push(match spec.difficulty.as_str() {
        "easy" => "Ready to step up? Try this again on medium difficulty.".to_string(),
        "hard" => format!(
            "Mastered it? Try a longer {}-question round.",
            spec.question_count.saturating_add(5)
        ),
        _ => "Feeling confident? Try a hard-difficulty version next.".to_string(),
    });

    for topic in catalog::related_topics(&spec.subject, spec.topic.as_deref(), 2) {
        suggestions.push(format!("Quiz yourself on {} next.", topic));
    }

    suggestions.push(if spec.quiz_type == "mixed" {
        "Try an all multiple-choice round for speed.".to_string()
    } else {
        "Try a mixed-format quiz for variety.".to_string()
    });

    suggestions.push("Ask the tutor to review your results when you're done.".to_string());

    suggestions.truncate(4);
    suggestions
}

#[async_trait]
impl Agent for QuizAgent {
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

        // Routing metadata from the orchestrator seeds the slot map before
        // this turn's own extraction lands on top.
        if let Some(info) = &ctx.orchestrator_info {
            let seeded: HashMap<String, Value> = info.into();
            self.core.context_mut().merge(&seeded);
        }

        let prompt = self.build_prompt(input, ctx);
        let raw = self
            .completion
            .complete(&prompt, &CompletionOptions::structured())
            .await?;

        let extraction = match parse_structured::<SlotExtraction>(&raw) {
            Ok(extraction) => extraction,
            Err(err) => {
                tracing::warn!(%err, "slot extraction unusable, asking for the subject");
                Self::fallback_extraction()
            }
        };

        self.core.context_mut().merge(&extraction.extracted_info);

        if extraction.needs_more_info {
            let outcome = Outcome::InfoRequest {
                agent: AgentKind::Quiz,
                message: if extraction.message.is_empty() {
                    "Tell me a bit more so I can build the right quiz.".into()
                } else {
                    extraction.message
                },
                missing_info: extraction.missing_info,
                suggested_questions: extraction.suggested_questions,
                topic_suggestions: extraction.topic_suggestions,
            };
            self.core.finish_turn(&outcome, AgentState::WaitingForInput);
            return Ok(outcome);
        }

        self.core.set_state(AgentState::Generating);
        let spec = self.finalize_spec();
        let suggestions = next_suggestions(&spec);

        let outcome = Outcome::QuizGenerated {
            agent: AgentKind::Quiz,
            message: format!(
                "Your {} {} quiz with {} questions is ready!",
                spec.difficulty,
                spec.topic.as_deref().unwrap_or(&spec.subject),
                spec.question_count
            ),
            quiz: spec,
            next_suggestions: suggestions,
        };
        self.core.finish_turn(&outcome, AgentState::Completed);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockCompletion;
    use serde_json::json;

    fn done_extraction(extracted: Value) -> String {
        json!({
            "needsMoreInfo": false,
            "extractedInfo": extracted,
            "missingInfo": [],
            "message": "",
            "suggestedQuestions": [],
            "topicSuggestions": []
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_defaults_applied_on_finalize() {
        let mock = MockCompletion::with_responses(vec![Ok(done_extraction(
            json!({"subject": "Biology"}),
        ))]);
        let mut agent = QuizAgent::new(Arc::new(mock));

        let outcome = agent
            .process("quiz me on biology", &SessionContext::new())
            .await
            .unwrap();

        match outcome {
            Outcome::QuizGenerated { quiz, .. } => {
                assert_eq!(quiz.subject, "Biology");
                assert_eq!(quiz.question_count, 5);
                assert_eq!(quiz.difficulty, "medium");
                assert_eq!(quiz.quiz_type, "mixed");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(agent.state(), AgentState::Completed);
    }

    #[tokio::test]
    async fn test_slots_accumulate_across_turns() {
        let mock = MockCompletion::with_responses(vec![
            Ok(json!({
                "needsMoreInfo": true,
                "extractedInfo": {"subject": "Mathematics"},
                "missingInfo": ["questionCount"],
                "message": "How many questions?",
                "suggestedQuestions": [],
                "topicSuggestions": ["Algebra", "Geometry"]
            })
            .to_string()),
            Ok(done_extraction(json!({"questionCount": 10}))),
        ]);
        let mut agent = QuizAgent::new(Arc::new(mock));
        let ctx = SessionContext::new();

        let first = agent.process("math quiz please", &ctx).await.unwrap();
        assert!(matches!(first, Outcome::InfoRequest { .. }));
        assert_eq!(agent.state(), AgentState::WaitingForInput);

        let second = agent.process("10 questions", &ctx).await.unwrap();
        match second {
            Outcome::QuizGenerated { quiz, .. } => {
                // Both turns' slots survive the merge
                assert_eq!(quiz.subject, "Mathematics");
                assert_eq!(quiz.question_count, 10);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_numeric_count_defaults_to_five() {
        let mock = MockCompletion::with_responses(vec![Ok(done_extraction(
            json!({"subject": "Physics", "questionCount": "a bunch"}),
        ))]);
        let mut agent = QuizAgent::new(Arc::new(mock));

        let outcome = agent.process("physics quiz", &SessionContext::new()).await.unwrap();
        match outcome {
            Outcome::QuizGenerated { quiz, .. } => assert_eq!(quiz.question_count, 5),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_extraction_degrades_to_info_request() {
        let mock = MockCompletion::with_responses(vec![Ok("no json here".into())]);
        let mut agent = QuizAgent::new(Arc::new(mock));

        let outcome = agent.process("Quiz me", &SessionContext::new()).await.unwrap();
        match outcome {
            Outcome::InfoRequest {
                missing_info,
                topic_suggestions,
                ..
            } => {
                assert!(missing_info.contains(&"subject".to_string()));
                assert!(!topic_suggestions.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(agent.state(), AgentState::WaitingForInput);
    }

    #[test]
    fn test_suggestions_exclude_current_topic_and_cap() {
        let spec = QuizSpec {
            subject: "Mathematics".into(),
            topic: Some("Algebra".into()),
            question_count: 5,
            difficulty: "medium".into(),
            quiz_type: "mixed".into(),
        };

        let suggestions = next_suggestions(&spec);
        assert!(suggestions.len() <= 4);
        assert!(suggestions
            .iter()
            .all(|s| !s.contains("on Algebra next")));

        let related: Vec<_> = suggestions
            .iter()
            .filter(|s| s.starts_with("Quiz yourself on"))
            .collect();
        assert!(related.len() <= 2);
    }

    #[test]
    fn test_suggestions_survive_huge_question_count() {
        let spec = QuizSpec {
            subject: "Physics".into(),
            topic: None,
            question_count: u32::MAX,
            difficulty: "hard".into(),
            quiz_type: "mixed".into(),
        };
        assert!(next_suggestions(&spec)[0].starts_with("Mastered"));
    }

    #[test]
    fn test_suggestions_difficulty_progression() {
        let mut spec = QuizSpec {
            subject: "Biology".into(),
            topic: None,
            question_count: 5,
            difficulty: "easy".into(),
            quiz_type: "mixed".into(),
        };
        assert!(next_suggestions(&spec)[0].contains("medium"));

        spec.difficulty = "medium".into();
        assert!(next_suggestions(&spec)[0].contains("hard"));
    }
}
