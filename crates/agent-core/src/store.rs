//! Quiz/Review Datastore Interface
//!
//! The core never owns persistence; it reads and writes through this
//! trait. The tutor flow's quiz-list and ordinal resolution live in the
//! caller layer on top of these operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::outcome::QuizSpec;

/// A stored quiz attempt summary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizRecord {
    /// Quiz identifier
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Academic subject
    pub subject: String,

    /// Concept/topic the quiz covered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,

    /// Score in percent, if graded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,

    /// Whether the attempt was completed
    pub completed: bool,

    /// Completion/attempt time; falls back to creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted_at: Option<DateTime<Utc>>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl QuizRecord {
    /// Best-known activity timestamp for recency sorting
    pub fn activity_time(&self) -> DateTime<Utc> {
        self.attempted_at.unwrap_or(self.created_at)
    }
}

/// A generated performance review
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Quiz this review covers
    pub quiz_id: String,

    /// Owning user
    pub user_id: String,

    /// Review narrative
    pub body: String,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Datastore operations the core needs
pub trait QuizStore: Send + Sync {
    /// All quizzes belonging to a user
    fn user_quizzes(&self, user_id: &str) -> Result<Vec<QuizRecord>>;

    /// A single quiz by id
    fn quiz_by_id(&self, id: &str) -> Result<Option<QuizRecord>>;

    /// The review for a quiz, if one exists
    fn review_by_quiz_id(&self, quiz_id: &str) -> Result<Option<ReviewRecord>>;

    /// Trigger creation of a review for a completed quiz
    fn generate_review(&self, quiz_id: &str, user_id: &str) -> Result<ReviewRecord>;

    /// Persist a finalized quiz specification, returning its id
    fn create_quiz(&self, user_id: &str, spec: &QuizSpec) -> Result<String>;
}

/// In-memory store (for development/testing)
#[derive(Default)]
pub struct MemoryQuizStore {
    quizzes: std::sync::RwLock<Vec<QuizRecord>>,
    reviews: std::sync::RwLock<Vec<ReviewRecord>>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly (test/development helper)
    pub fn insert(&self, record: QuizRecord) {
        self.quizzes.write().unwrap().push(record);
    }
}

impl QuizStore for MemoryQuizStore {
    fn user_quizzes(&self, user_id: &str) -> Result<Vec<QuizRecord>> {
        let quizzes = self.quizzes.read().unwrap();
        let mut result: Vec<_> = quizzes
            .iter()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();

        // Most recent activity first
        result.sort_by(|a, b| b.activity_time().cmp(&a.activity_time()));
        Ok(result)
    }

    fn quiz_by_id(&self, id: &str) -> Result<Option<QuizRecord>> {
        let quizzes = self.quizzes.read().unwrap();
        Ok(quizzes.iter().find(|q| q.id == id).cloned())
    }

    fn review_by_quiz_id(&self, quiz_id: &str) -> Result<Option<ReviewRecord>> {
        let reviews = self.reviews.read().unwrap();
        Ok(reviews.iter().find(|r| r.quiz_id == quiz_id).cloned())
    }

    fn generate_review(&self, quiz_id: &str, user_id: &str) -> Result<ReviewRecord> {
        let quiz = self
            .quiz_by_id(quiz_id)?
            .ok_or_else(|| AgentError::NotFound(format!("quiz {}", quiz_id)))?;

        let review = ReviewRecord {
            quiz_id: quiz_id.to_string(),
            user_id: user_id.to_string(),
            body: format!(
                "Review of your {} quiz{}",
                quiz.subject,
                quiz.score
                    .map(|s| format!(" (scored {:.0}%)", s))
                    .unwrap_or_default()
            ),
            created_at: Utc::now(),
        };

        self.reviews.write().unwrap().push(review.clone());
        tracing::debug!(quiz_id, "generated review");
        Ok(review)
    }

    fn create_quiz(&self, user_id: &str, spec: &QuizSpec) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let record = QuizRecord {
            id: id.clone(),
            user_id: user_id.to_string(),
            subject: spec.subject.clone(),
            concept: spec.topic.clone(),
            score: None,
            completed: false,
            attempted_at: None,
            created_at: Utc::now(),
        };
        self.quizzes.write().unwrap().push(record);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: &str, user: &str, completed: bool, hours_ago: i64) -> QuizRecord {
        let t = Utc::now() - Duration::hours(hours_ago);
        QuizRecord {
            id: id.into(),
            user_id: user.into(),
            subject: "Biology".into(),
            concept: None,
            score: completed.then_some(80.0),
            completed,
            attempted_at: completed.then_some(t),
            created_at: t,
        }
    }

    #[test]
    fn test_user_quizzes_sorted_by_recency() {
        let store = MemoryQuizStore::new();
        store.insert(record("old", "u1", true, 48));
        store.insert(record("new", "u1", true, 1));
        store.insert(record("other", "u2", true, 1));

        let quizzes = store.user_quizzes("u1").unwrap();
        assert_eq!(quizzes.len(), 2);
        assert_eq!(quizzes[0].id, "new");
    }

    #[test]
    fn test_generate_review_requires_quiz() {
        let store = MemoryQuizStore::new();
        assert!(store.generate_review("missing", "u1").is_err());

        store.insert(record("q1", "u1", true, 2));
        let review = store.generate_review("q1", "u1").unwrap();
        assert_eq!(review.quiz_id, "q1");
        assert!(store.review_by_quiz_id("q1").unwrap().is_some());
    }

    #[test]
    fn test_create_quiz() {
        let store = MemoryQuizStore::new();
        let spec = QuizSpec {
            subject: "Mathematics".into(),
            topic: Some("Algebra".into()),
            question_count: 5,
            difficulty: "medium".into(),
            quiz_type: "mixed".into(),
        };

        let id = store.create_quiz("u1", &spec).unwrap();
        let stored = store.quiz_by_id(&id).unwrap().unwrap();
        assert_eq!(stored.subject, "Mathematics");
        assert!(!stored.completed);
    }
}
