//! crates/qa_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

/// Storage-assigned identifier of a question.
pub type QuestionId = i64;

/// Storage-assigned identifier of an answer.
pub type AnswerId = i64;

/// A question as persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// An answer to a question. It never outlives the question it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The fields an answer is created from; id and timestamp come from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: QuestionId,
    pub user_id: String,
    pub text: String,
}
