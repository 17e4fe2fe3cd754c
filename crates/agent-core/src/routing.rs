//! Routing Decision Types
//!
//! Structured output of the orchestrator's intent classification. Produced
//! fresh per input and not persisted beyond the single call. The wire shape
//! mirrors what the classification prompt asks the model for (camelCase).

use serde::{Deserialize, Serialize};

use crate::state::AgentKind;

/// Intent payload extracted alongside the routing decision
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedInfo {
    /// Short intent label (e.g. "create_quiz")
    pub intent: Option<String>,

    /// Academic subject, if mentioned
    pub subject: Option<String>,

    /// Topic within the subject, if mentioned
    pub topic: Option<String>,

    /// Requested number of questions
    pub question_count: Option<u32>,

    /// Requested difficulty
    pub difficulty: Option<String>,

    /// Requested quiz format
    pub quiz_type: Option<String>,

    /// Whether the target agent will need clarification
    pub needs_more_info: bool,

    /// Slot names still missing
    pub missing_info: Vec<String>,
}

/// The orchestrator's classification result
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    /// Selected target agent
    pub target: AgentKind,

    /// Classifier confidence, 0.0–1.0
    pub confidence: f32,

    /// Free-text rationale from the classifier
    pub reasoning: String,

    /// Intent payload forwarded to the target agent
    #[serde(default)]
    pub extracted: ExtractedInfo,

    /// Clarifying prompts the UI may surface
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

impl RoutingDecision {
    /// Clamp confidence into the documented range
    pub fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let raw = r#"{
            "target": "quiz",
            "confidence": 0.9,
            "reasoning": "user asked for a quiz",
            "extracted": {"subject": "Biology", "questionCount": 5, "needsMoreInfo": false},
            "suggestedQuestions": []
        }"#;

        let decision: RoutingDecision = serde_json::from_str(raw).unwrap();
        assert_eq!(decision.target, AgentKind::Quiz);
        assert_eq!(decision.extracted.question_count, Some(5));
    }

    #[test]
    fn test_unknown_target_fails_to_parse() {
        let raw = r#"{"target": "billing", "confidence": 1.0, "reasoning": ""}"#;
        assert!(serde_json::from_str::<RoutingDecision>(raw).is_err());
    }

    #[test]
    fn test_confidence_clamped() {
        let decision = RoutingDecision {
            target: AgentKind::General,
            confidence: 1.7,
            reasoning: String::new(),
            extracted: ExtractedInfo::default(),
            suggested_questions: Vec::new(),
        }
        .clamped();
        assert!((decision.confidence - 1.0).abs() < f32::EPSILON);
    }
}
