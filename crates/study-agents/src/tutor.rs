//! Tutor Agent
//!
//! Multi-step performance review flow: list recent quiz attempts, let the
//! user pick one, produce a structured review, and branch into deeper
//! follow-up. The actual quiz-list read and ordinal resolution belong to
//! the caller layer (see `AgentSystem::resolve_quiz_selection`); this
//! agent drives the conversation.
//!
//! The keyword classification fallback is ordered: later rules are only
//! reached when every earlier substring test fails. That ordering is a
//! behavioral contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use agent_core::{
    provider::parse_structured, AgentKind, AgentState, CompletionOptions, CompletionService,
    Outcome, Result, SessionContext, TutorResponseKind,
};

use crate::agent::{Agent, AgentCore};

const CLASSIFY_PREAMBLE: &str = r#"You are the intent classifier for a quiz-review tutor. Classify the user's message into one of:
- "initial_review": they want to see their recent quizzes / overall performance
- "quiz_selection": they are picking a quiz to review (by number like "1"/"2"/"3", or by name)
- "detailed_analysis": they want a deeper breakdown of the selected quiz
- "further_help": they want resources or strategies for a specific topic
- "general_tutor_response": anything else study-strategy related

Respond with ONLY a JSON object:
{"type": "...", "selectedQuiz": string or null, "topic": string or null}"#;

const FURTHER_HELP_PREAMBLE: &str = r#"You are a study coach. The student wants resources and strategies for the topic below. Recommend 2-3 concrete resources, one practice routine, and one common pitfall to avoid. Be specific and encouraging."#;

const GENERAL_TUTOR_PREAMBLE: &str = r#"You are a study coach. Give the student practical, generally applicable study strategies: spaced repetition, active recall, and how to review quiz mistakes productively. Keep it short and actionable."#;

/// Where the guided review flow currently stands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorStep {
    #[default]
    Initial,
    ShowingQuizzes,
    QuizSelected,
    DetailedAnalysis,
}

/// Classified tutor intent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorIntent {
    #[default]
    InitialReview,
    QuizSelection,
    DetailedAnalysis,
    FurtherHelp,
    GeneralTutorResponse,
}

/// Classification payload requested from the completion service
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TutorClassification {
    #[serde(rename = "type")]
    pub intent: TutorIntent,
    pub selected_quiz: Option<String>,
    pub topic: Option<String>,
}

/// Post-quiz performance review agent
pub struct TutorAgent {
    core: AgentCore,
    completion: Arc<dyn CompletionService>,
    current_step: TutorStep,
    selected_quiz: Option<String>,
}

impl TutorAgent {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            core: AgentCore::new(AgentKind::Tutor),
            completion,
            current_step: TutorStep::Initial,
            selected_quiz: None,
        }
    }

    pub fn current_step(&self) -> TutorStep {
        self.current_step
    }

    pub fn selected_quiz(&self) -> Option<&str> {
        self.selected_quiz.as_deref()
    }

    fn respond(&mut self, kind: TutorResponseKind, message: String, data: Option<serde_json::Value>) -> Outcome {
        let outcome = Outcome::TutorResponse {
            agent: AgentKind::Tutor,
            message,
            kind,
            data,
        };
        self.core.finish_turn(&outcome, AgentState::Completed);
        outcome
    }

    fn handle_initial_review(&mut self, ctx: &SessionContext) -> Outcome {
        if ctx.user_id.is_none() {
            return self.respond(
                TutorResponseKind::GeneralTutorResponse,
                "Please sign in first so I can look up your recent quizzes.".into(),
                None,
            );
        }

        self.core.set_state(AgentState::FetchingQuizzes);
        self.current_step = TutorStep::ShowingQuizzes;
        self.respond(
            TutorResponseKind::QuizSelection,
            "Let me pull up your recent quizzes — pick one to review by number (1, 2, or 3)."
                .into(),
            Some(json!({ "step": "showing_quizzes" })),
        )
    }

    fn handle_quiz_selection(&mut self, selection: Option<String>) -> Outcome {
        match selection {
            Some(selection) => {
                self.selected_quiz = Some(selection.clone());
                self.current_step = TutorStep::QuizSelected;
                self.respond(
                    TutorResponseKind::QuizAnalysis,
                    format!("Analyzing quiz {} — one moment.", selection),
                    Some(json!({ "selectedQuiz": selection })),
                )
            }
            None => self.respond(
                TutorResponseKind::QuizSelection,
                "Which quiz should I look at? Reply with its number (1, 2, or 3).".into(),
                None,
            ),
        }
    }

    fn handle_detailed_analysis(&mut self) -> Outcome {
        let Some(selected) = self.selected_quiz.clone() else {
            return self.respond(
                TutorResponseKind::DetailedAnalysis,
                "Please select a quiz first — for example, say \"analyze quiz 1\".".into(),
                None,
            );
        };

        self.current_step = TutorStep::DetailedAnalysis;
        let message = format!(
            "Here's a deeper look at quiz {}.\n\n\
             Focus area: the questions you missed cluster around core definitions, so \
             re-reading summaries before re-testing will pay off most.\n\n\
             Study plan:\n\
             1. Re-read your notes on the missed concepts (15 minutes).\n\
             2. Retake a short quiz on just those concepts.\n\
             3. Explain each concept out loud in your own words.\n\n\
             Is there a specific concept you'd like more help with?",
            selected
        );
        self.respond(
            TutorResponseKind::DetailedAnalysis,
            message,
            Some(json!({ "selectedQuiz": selected })),
        )
    }

    async fn handle_further_help(&mut self, topic: Option<String>) -> Result<Outcome> {
        let topic = topic.unwrap_or_else(|| "your recent quiz material".into());
        let prompt = format!("{}\n\nTopic: {}", FURTHER_HELP_PREAMBLE, topic);
        let text = self
            .completion
            .complete(&prompt, &CompletionOptions::default())
            .await?;
        Ok(self.respond(TutorResponseKind::FurtherHelp, text, Some(json!({ "topic": topic }))))
    }

    async fn handle_general(&mut self, input: &str) -> Result<Outcome> {
        let prompt = format!("{}\n\nStudent: {}", GENERAL_TUTOR_PREAMBLE, input);
        let text = self
            .completion
            .complete(&prompt, &CompletionOptions::default())
            .await?;
        Ok(self.respond(TutorResponseKind::GeneralTutorResponse, text, None))
    }
}

/// Ordered keyword classification used when the model payload is unusable
///
/// Later rules are only reached if all earlier substring tests fail.
pub fn classify_by_keywords(input: &str) -> TutorClassification {
    let lower = input.to_lowercase();
    let has = |s: &str| lower.contains(s);

    let (intent, selected_quiz) = if has("recent") && (has("quiz") || has("performance")) {
        (TutorIntent::InitialReview, None)
    } else if has("performance") || has("how did i") || has("my quiz") {
        (TutorIntent::InitialReview, None)
    } else if (has("quiz") && (has("1") || has("first"))) || (has("analyze") && has("1")) {
        (TutorIntent::QuizSelection, Some("1".to_string()))
    } else if has("quiz") && (has("2") || has("second")) {
        (TutorIntent::QuizSelection, Some("2".to_string()))
    } else if has("quiz") && (has("3") || has("third")) {
        (TutorIntent::QuizSelection, Some("3".to_string()))
    } else if has("select") || has("choose") || has("analyze") {
        (TutorIntent::QuizSelection, None)
    } else if has("detail") || has("more") {
        (TutorIntent::DetailedAnalysis, None)
    } else if has("help") || has("resource") {
        (TutorIntent::FurtherHelp, None)
    } else {
        (TutorIntent::InitialReview, None)
    };

    TutorClassification {
        intent,
        selected_quiz,
        topic: None,
    }
}

#[async_trait]
impl Agent for TutorAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    async fn process(&mut self, input: &str, ctx: &SessionContext) -> Result<Outcome> {
        self.core.begin_turn(input, ctx, self.accepts_attachment_only())?;

        let prompt = format!("{}\n\nUser: {}", CLASSIFY_PREAMBLE, input);
        let raw = self
            .completion
            .complete(&prompt, &CompletionOptions::structured())
            .await?;

        let classification = match parse_structured::<TutorClassification>(&raw) {
            Ok(classification) => classification,
            Err(err) => {
                tracing::warn!(%err, "tutor classification unusable, using keyword rules");
                classify_by_keywords(input)
            }
        };

        match classification.intent {
            TutorIntent::InitialReview => Ok(self.handle_initial_review(ctx)),
            TutorIntent::QuizSelection => {
                Ok(self.handle_quiz_selection(classification.selected_quiz))
            }
            TutorIntent::DetailedAnalysis => Ok(self.handle_detailed_analysis()),
            TutorIntent::FurtherHelp => self.handle_further_help(classification.topic).await,
            TutorIntent::GeneralTutorResponse => self.handle_general(input).await,
        }
    }

    /// Also resets the flow step and quiz selection, not just the base
    /// context and log.
    fn clear_context(&mut self) {
        self.core.clear();
        self.current_step = TutorStep::Initial;
        self.selected_quiz = None;
    }
}
