//! crates/qa_core/src/services.rs
//!
//! The business operations on questions and answers. Services validate input,
//! call the repository ports and translate every `PortError` into a `DomainError`,
//! so nothing storage-specific travels further up.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{Answer, AnswerId, NewAnswer, Question, QuestionId};
use crate::error::{DomainError, DomainResult};
use crate::ports::{AnswerRepository, PortError, QuestionRepository};
use crate::validation::{validate_answer, validate_question_text};

//=========================================================================================
// Service Traits
//=========================================================================================

#[async_trait]
pub trait QuestionService: Send + Sync {
    async fn create_question(&self, text: &str) -> DomainResult<Question>;

    async fn get_question(&self, id: QuestionId) -> DomainResult<Question>;

    async fn get_all_questions(&self) -> DomainResult<Vec<Question>>;

    async fn delete_question(&self, id: QuestionId) -> DomainResult<()>;
}

#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn create_answer(
        &self,
        question_id: QuestionId,
        user_id: &str,
        text: &str,
    ) -> DomainResult<Answer>;

    async fn get_answer(&self, id: AnswerId) -> DomainResult<Answer>;

    async fn get_answers_by_question(&self, question_id: QuestionId) -> DomainResult<Vec<Answer>>;

    async fn delete_answer(&self, id: AnswerId) -> DomainResult<()>;
}

//=========================================================================================
// QuestionManager
//=========================================================================================

/// The `QuestionService` backed by a `QuestionRepository`.
#[derive(Clone)]
pub struct QuestionManager {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionManager {
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionService for QuestionManager {
    async fn create_question(&self, text: &str) -> DomainResult<Question> {
        validate_question_text(text)?;

        let existing = self.questions.get_by_text(text).await.map_err(|e| {
            warn!("Duplicate check for question text failed: {}", e);
            DomainError::DatabaseQuery
        })?;
        if existing.is_some() {
            return Err(DomainError::QuestionAlreadyExists);
        }

        // The store's unique constraint catches the race the check above leaves open.
        self.questions.create(text).await.map_err(|e| match e {
            PortError::Conflict(_) => DomainError::QuestionAlreadyExists,
            other => {
                warn!("Failed to persist question: {}", other);
                DomainError::DatabaseQuery
            }
        })
    }

    async fn get_question(&self, id: QuestionId) -> DomainResult<Question> {
        self.questions.get_by_id(id).await.map_err(|e| {
            warn!("Lookup of question {} failed: {}", id, e);
            DomainError::QuestionNotFound
        })
    }

    async fn get_all_questions(&self) -> DomainResult<Vec<Question>> {
        self.questions.get_all().await.map_err(|e| {
            warn!("Listing questions failed: {}", e);
            DomainError::DatabaseQuery
        })
    }

    async fn delete_question(&self, id: QuestionId) -> DomainResult<()> {
        self.questions.delete(id).await.map_err(|e| match e {
            PortError::NotFound(_) => DomainError::QuestionNotFound,
            other => {
                warn!("Failed to delete question {}: {}", id, other);
                DomainError::DatabaseQuery
            }
        })
    }
}

//=========================================================================================
// AnswerManager
//=========================================================================================

/// The `AnswerService`. It reads questions to check that an answer's target exists.
#[derive(Clone)]
pub struct AnswerManager {
    answers: Arc<dyn AnswerRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl AnswerManager {
    pub fn new(answers: Arc<dyn AnswerRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { answers, questions }
    }
}

#[async_trait]
impl AnswerService for AnswerManager {
    async fn create_answer(
        &self,
        question_id: QuestionId,
        user_id: &str,
        text: &str,
    ) -> DomainResult<Answer> {
        validate_answer(user_id, text)?;

        self.questions.get_by_id(question_id).await.map_err(|e| {
            warn!("Question {} lookup before answering failed: {}", question_id, e);
            DomainError::QuestionNotFound
        })?;

        let new_answer = NewAnswer {
            question_id,
            user_id: user_id.to_string(),
            text: text.to_string(),
        };
        self.answers.create(new_answer).await.map_err(|e| match e {
            // The question vanished between the check and the insert.
            PortError::NotFound(_) => DomainError::QuestionNotFound,
            other => {
                warn!("Failed to persist answer for question {}: {}", question_id, other);
                DomainError::DatabaseQuery
            }
        })
    }

    async fn get_answer(&self, id: AnswerId) -> DomainResult<Answer> {
        self.answers.get_by_id(id).await.map_err(|e| {
            warn!("Lookup of answer {} failed: {}", id, e);
            DomainError::AnswerNotFound
        })
    }

    async fn get_answers_by_question(&self, question_id: QuestionId) -> DomainResult<Vec<Answer>> {
        self.answers
            .get_by_question_id(question_id)
            .await
            .map_err(|e| {
                warn!("Listing answers of question {} failed: {}", question_id, e);
                DomainError::DatabaseQuery
            })
    }

    async fn delete_answer(&self, id: AnswerId) -> DomainResult<()> {
        self.answers.delete(id).await.map_err(|e| match e {
            PortError::NotFound(_) => DomainError::AnswerNotFound,
            other => {
                warn!("Failed to delete answer {}: {}", id, other);
                DomainError::DatabaseQuery
            }
        })
    }
}
