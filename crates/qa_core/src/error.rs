//! crates/qa_core/src/error.rs
//!
//! The domain error vocabulary shared by the service layer and the web layer.
//! Every variant knows the HTTP status and the user-facing message it maps to,
//! so the web layer never has to inspect storage errors itself.

/// A closed set of failures a business operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("question not found")]
    QuestionNotFound,
    #[error("invalid question text")]
    InvalidQuestionText,
    #[error("question already exists")]
    QuestionAlreadyExists,
    #[error("answer not found")]
    AnswerNotFound,
    #[error("invalid answer text")]
    InvalidAnswerText,
    #[error("invalid user id")]
    InvalidUserId,
    #[error("database query error")]
    DatabaseQuery,
    #[error("database connection error")]
    DatabaseConnection,
    #[error("validation failed")]
    ValidationFailed,
}

/// A convenience type alias for `Result<T, DomainError>`.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// The HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::QuestionNotFound | Self::AnswerNotFound => 404,
            Self::QuestionAlreadyExists => 409,
            Self::InvalidQuestionText
            | Self::InvalidAnswerText
            | Self::InvalidUserId
            | Self::ValidationFailed => 400,
            Self::DatabaseQuery | Self::DatabaseConnection => 500,
        }
    }

    /// The message shown to API clients.
    pub fn message(&self) -> &'static str {
        match self {
            Self::QuestionNotFound => "question not found",
            Self::InvalidQuestionText => "invalid question text",
            Self::QuestionAlreadyExists => "question already exists",
            Self::AnswerNotFound => "answer not found",
            Self::InvalidAnswerText => "invalid answer text",
            Self::InvalidUserId => "invalid user id",
            Self::DatabaseQuery => "database query error",
            Self::DatabaseConnection => "database connection error",
            Self::ValidationFailed => "validation failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DomainError::QuestionNotFound, 404)]
    #[case(DomainError::AnswerNotFound, 404)]
    #[case(DomainError::QuestionAlreadyExists, 409)]
    #[case(DomainError::InvalidQuestionText, 400)]
    #[case(DomainError::InvalidAnswerText, 400)]
    #[case(DomainError::InvalidUserId, 400)]
    #[case(DomainError::ValidationFailed, 400)]
    #[case(DomainError::DatabaseQuery, 500)]
    #[case(DomainError::DatabaseConnection, 500)]
    fn each_kind_carries_its_status(#[case] error: DomainError, #[case] status: u16) {
        assert_eq!(error.status_code(), status);
    }

    #[test]
    fn display_matches_client_message() {
        for error in [
            DomainError::QuestionNotFound,
            DomainError::QuestionAlreadyExists,
            DomainError::InvalidUserId,
            DomainError::DatabaseQuery,
        ] {
            assert_eq!(error.to_string(), error.message());
        }
    }
}
