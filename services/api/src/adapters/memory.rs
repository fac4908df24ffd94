//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of both repository ports. It mirrors the
//! PostgreSQL schema rules: unique question text, answers must reference an
//! existing question, and deleting a question deletes its answers.

use async_trait::async_trait;
use chrono::Utc;
use qa_core::domain::{Answer, AnswerId, NewAnswer, Question, QuestionId};
use qa_core::ports::{AnswerRepository, PortError, PortResult, QuestionRepository};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    questions: BTreeMap<QuestionId, Question>,
    answers: BTreeMap<AnswerId, Answer>,
    last_question_id: QuestionId,
    last_answer_id: AnswerId,
}

/// Volatile storage for local runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn create(&self, text: &str) -> PortResult<Question> {
        let mut tables = self.tables.lock().await;
        if tables.questions.values().any(|q| q.text == text) {
            return Err(PortError::Conflict(format!("Question '{}' already exists", text)));
        }

        tables.last_question_id += 1;
        let question = Question {
            id: tables.last_question_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn get_by_id(&self, id: QuestionId) -> PortResult<Question> {
        let tables = self.tables.lock().await;
        tables
            .questions
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Question {} not found", id)))
    }

    async fn get_by_text(&self, text: &str) -> PortResult<Option<Question>> {
        let tables = self.tables.lock().await;
        Ok(tables.questions.values().find(|q| q.text == text).cloned())
    }

    async fn get_all(&self) -> PortResult<Vec<Question>> {
        let tables = self.tables.lock().await;
        let rows: Vec<Question> = tables.questions.values().cloned().collect();
        Ok(newest_first(rows, |q: &Question| (q.created_at, q.id)))
    }

    async fn delete(&self, id: QuestionId) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.questions.remove(&id).is_none() {
            return Err(PortError::NotFound(format!("Question {} not found", id)));
        }
        tables.answers.retain(|_, a| a.question_id != id);
        Ok(())
    }
}

#[async_trait]
impl AnswerRepository for MemoryStore {
    async fn create(&self, answer: NewAnswer) -> PortResult<Answer> {
        let mut tables = self.tables.lock().await;
        if !tables.questions.contains_key(&answer.question_id) {
            return Err(PortError::NotFound(format!(
                "Question {} not found",
                answer.question_id
            )));
        }

        tables.last_answer_id += 1;
        let answer = Answer {
            id: tables.last_answer_id,
            question_id: answer.question_id,
            user_id: answer.user_id,
            text: answer.text,
            created_at: Utc::now(),
        };
        tables.answers.insert(answer.id, answer.clone());
        Ok(answer)
    }

    async fn get_by_id(&self, id: AnswerId) -> PortResult<Answer> {
        let tables = self.tables.lock().await;
        tables
            .answers
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Answer {} not found", id)))
    }

    async fn get_by_question_id(&self, question_id: QuestionId) -> PortResult<Vec<Answer>> {
        let tables = self.tables.lock().await;
        let rows: Vec<Answer> = tables
            .answers
            .values()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &Answer| (a.created_at, a.id)))
    }

    async fn delete(&self, id: AnswerId) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        match tables.answers.remove(&id) {
            Some(_) => Ok(()),
            None => Err(PortError::NotFound(format!("Answer {} not found", id))),
        }
    }
}
