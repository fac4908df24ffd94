//! crates/qa_core/src/ports.rs
//!
//! Defines the persistence contracts (traits) the services depend on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete store (PostgreSQL, in-memory, test fakes).

use async_trait::async_trait;

use crate::domain::{Answer, AnswerId, NewAnswer, Question, QuestionId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors of the storage driver.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persists a question; the store assigns its id and creation time.
    async fn create(&self, text: &str) -> PortResult<Question>;

    async fn get_by_id(&self, id: QuestionId) -> PortResult<Question>;

    /// Exact text match, used for duplicate detection.
    async fn get_by_text(&self, text: &str) -> PortResult<Option<Question>>;

    /// All questions, most recent first.
    async fn get_all(&self) -> PortResult<Vec<Question>>;

    /// Deletes a question and, through the store's cascade, its answers.
    /// Reports `NotFound` when nothing was deleted.
    async fn delete(&self, id: QuestionId) -> PortResult<()>;
}

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Persists an answer. Reports `NotFound` when the question does not exist.
    async fn create(&self, answer: NewAnswer) -> PortResult<Answer>;

    async fn get_by_id(&self, id: AnswerId) -> PortResult<Answer>;

    /// Answers of one question, most recent first.
    async fn get_by_question_id(&self, question_id: QuestionId) -> PortResult<Vec<Answer>>;

    async fn delete(&self, id: AnswerId) -> PortResult<()>;
}
