//! Agent Outcomes
//!
//! The tagged result a specialized agent returns from `process`. Each
//! variant's required fields are statically enforced; every outcome
//! carries exactly one `agent` tag identifying its producer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AgentKind;

/// Finalized quiz specification emitted by the quiz agent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSpec {
    /// Academic subject (required slot)
    pub subject: String,

    /// Topic within the subject, if narrowed down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Number of questions (defaults to 5)
    pub question_count: u32,

    /// Difficulty level (defaults to "medium")
    pub difficulty: String,

    /// Question format (defaults to "mixed")
    pub quiz_type: String,
}

impl QuizSpec {
    pub const DEFAULT_QUESTION_COUNT: u32 = 5;
    pub const DEFAULT_DIFFICULTY: &'static str = "medium";
    pub const DEFAULT_QUIZ_TYPE: &'static str = "mixed";
}

/// Sub-tag on tutor responses, keyed off by the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorResponseKind {
    QuizSelection,
    QuizAnalysis,
    DetailedAnalysis,
    FurtherHelp,
    GeneralTutorResponse,
}

/// Tagged result of a specialized agent's `process` call
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// The agent needs more data before it can finish
    InfoRequest {
        agent: AgentKind,
        message: String,
        #[serde(default)]
        missing_info: Vec<String>,
        #[serde(default)]
        suggested_questions: Vec<String>,
        #[serde(default)]
        topic_suggestions: Vec<String>,
    },

    /// Finalized quiz specification plus follow-up suggestions
    QuizGenerated {
        agent: AgentKind,
        message: String,
        quiz: QuizSpec,
        #[serde(default)]
        next_suggestions: Vec<String>,
    },

    /// Free-text study explanation
    StudyResponse { agent: AgentKind, message: String },

    /// Tutor flow response with a phase sub-tag
    TutorResponse {
        agent: AgentKind,
        message: String,
        kind: TutorResponseKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
}

impl Outcome {
    /// The agent that produced this outcome
    pub fn agent(&self) -> AgentKind {
        match self {
            Outcome::InfoRequest { agent, .. }
            | Outcome::QuizGenerated { agent, .. }
            | Outcome::StudyResponse { agent, .. }
            | Outcome::TutorResponse { agent, .. } => *agent,
        }
    }

    /// The user-facing message carried by this outcome
    pub fn message(&self) -> &str {
        match self {
            Outcome::InfoRequest { message, .. }
            | Outcome::QuizGenerated { message, .. }
            | Outcome::StudyResponse { message, .. }
            | Outcome::TutorResponse { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tag_round_trip() {
        let outcome = Outcome::QuizGenerated {
            agent: AgentKind::Quiz,
            message: "Here is your quiz.".into(),
            quiz: QuizSpec {
                subject: "Biology".into(),
                topic: Some("Photosynthesis".into()),
                question_count: 5,
                difficulty: "medium".into(),
                quiz_type: "mixed".into(),
            },
            next_suggestions: vec!["Try a hard quiz next".into()],
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "quiz_generated");
        assert_eq!(outcome.agent(), AgentKind::Quiz);
    }

    #[test]
    fn test_tutor_kind_labels() {
        let json = serde_json::to_value(TutorResponseKind::GeneralTutorResponse).unwrap();
        assert_eq!(json, "general_tutor_response");
    }
}
