//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! `QuestionRepository` and `AnswerRepository` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qa_core::domain::{Answer, AnswerId, NewAnswer, Question, QuestionId};
use qa_core::ports::{AnswerRepository, PortError, PortResult, QuestionRepository};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements both repository ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Translates a driver error into the port vocabulary.
fn port_error(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(db.message().to_string())
        }
        // Only the answers -> questions reference exists.
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => PortError::NotFound(what()),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct QuestionRecord {
    id: i64,
    text: String,
    created_at: DateTime<Utc>,
}
impl QuestionRecord {
    fn to_domain(self) -> Question {
        Question {
            id: self.id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AnswerRecord {
    id: i64,
    question_id: i64,
    user_id: String,
    text: String,
    created_at: DateTime<Utc>,
}
impl AnswerRecord {
    fn to_domain(self) -> Answer {
        Answer {
            id: self.id,
            question_id: self.question_id,
            user_id: self.user_id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `QuestionRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionRepository for DbAdapter {
    async fn create(&self, text: &str) -> PortResult<Question> {
        let record = sqlx::query_as::<_, QuestionRecord>(
            "INSERT INTO questions (text) VALUES ($1) RETURNING id, text, created_at",
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, || "Inserted question not returned".to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_by_id(&self, id: QuestionId) -> PortResult<Question> {
        let record = sqlx::query_as::<_, QuestionRecord>(
            "SELECT id, text, created_at FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("Question {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn get_by_text(&self, text: &str) -> PortResult<Option<Question>> {
        let record = sqlx::query_as::<_, QuestionRecord>(
            "SELECT id, text, created_at FROM questions WHERE text = $1",
        )
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(QuestionRecord::to_domain))
    }

    async fn get_all(&self) -> PortResult<Vec<Question>> {
        let records = sqlx::query_as::<_, QuestionRecord>(
            "SELECT id, text, created_at FROM questions ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let questions = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(questions)
    }

    async fn delete(&self, id: QuestionId) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Question {} not found", id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `AnswerRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnswerRepository for DbAdapter {
    async fn create(&self, answer: NewAnswer) -> PortResult<Answer> {
        let question_id = answer.question_id;
        let record = sqlx::query_as::<_, AnswerRecord>(
            "INSERT INTO answers (question_id, user_id, text) VALUES ($1, $2, $3) \
             RETURNING id, question_id, user_id, text, created_at",
        )
        .bind(answer.question_id)
        .bind(answer.user_id)
        .bind(answer.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("Question {} not found", question_id)))?;
        Ok(record.to_domain())
    }

    async fn get_by_id(&self, id: AnswerId) -> PortResult<Answer> {
        let record = sqlx::query_as::<_, AnswerRecord>(
            "SELECT id, question_id, user_id, text, created_at FROM answers WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, || format!("Answer {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn get_by_question_id(&self, question_id: QuestionId) -> PortResult<Vec<Answer>> {
        let records = sqlx::query_as::<_, AnswerRecord>(
            "SELECT id, question_id, user_id, text, created_at FROM answers \
             WHERE question_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let answers = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(answers)
    }

    async fn delete(&self, id: AnswerId) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Answer {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;
    use std::fmt;

    /// A driver error carrying only a constraint kind.
    #[derive(Debug)]
    struct ConstraintError(ErrorKind);

    impl fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint violated: {:?}", self.0)
        }
    }

    impl StdError for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn violation(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError(kind)))
    }

    fn missing() -> String {
        "Question 7 not found".to_string()
    }

    #[test]
    fn unique_violation_is_a_conflict() {
        let err = port_error(violation(ErrorKind::UniqueViolation), missing);

        assert!(matches!(err, PortError::Conflict(msg) if msg == "constraint violated"));
    }

    #[test]
    fn foreign_key_violation_means_the_question_is_gone() {
        let err = port_error(violation(ErrorKind::ForeignKeyViolation), missing);

        assert!(matches!(err, PortError::NotFound(msg) if msg == "Question 7 not found"));
    }

    #[test]
    fn missing_row_is_not_found() {
        let err = port_error(sqlx::Error::RowNotFound, missing);

        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[test]
    fn other_failures_are_unexpected() {
        let check = port_error(violation(ErrorKind::CheckViolation), missing);
        let closed = port_error(sqlx::Error::PoolClosed, missing);

        assert!(matches!(check, PortError::Unexpected(_)));
        assert!(matches!(closed, PortError::Unexpected(_)));
    }
}
