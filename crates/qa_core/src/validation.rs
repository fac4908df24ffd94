//! crates/qa_core/src/validation.rs
//!
//! Pure input checks run by the services before any storage call.

use crate::error::{DomainError, DomainResult};

/// Rejects question text that is empty once surrounding whitespace is trimmed.
pub fn validate_question_text(text: &str) -> DomainResult<()> {
    if text.trim().is_empty() {
        return Err(DomainError::InvalidQuestionText);
    }
    Ok(())
}

/// Checks an answer's author and text, in that order.
pub fn validate_answer(user_id: &str, text: &str) -> DomainResult<()> {
    if user_id.trim().is_empty() {
        return Err(DomainError::InvalidUserId);
    }
    if text.trim().is_empty() {
        return Err(DomainError::InvalidAnswerText);
    }
    Ok(())
}
