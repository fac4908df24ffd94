//! Input that fails decoding must never reach the services, and slow services
//! must not hold a request past its deadline.

mod support;

use api_lib::config::Config;
use async_trait::async_trait;
use axum::http::StatusCode;
use qa_core::{
    domain::{Answer, AnswerId, Question, QuestionId},
    error::{DomainError, DomainResult},
    services::{AnswerService, QuestionService},
};
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use support::{app_with, send};

/// Counts calls; optionally stalls each one.
#[derive(Default)]
struct RecordingServices {
    calls: AtomicUsize,
    stall: Option<Duration>,
}

impl RecordingServices {
    async fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionService for RecordingServices {
    async fn create_question(&self, _text: &str) -> DomainResult<Question> {
        self.record().await;
        Err(DomainError::ValidationFailed)
    }

    async fn get_question(&self, _id: QuestionId) -> DomainResult<Question> {
        self.record().await;
        Err(DomainError::QuestionNotFound)
    }

    async fn get_all_questions(&self) -> DomainResult<Vec<Question>> {
        self.record().await;
        Ok(Vec::new())
    }

    async fn delete_question(&self, _id: QuestionId) -> DomainResult<()> {
        self.record().await;
        Ok(())
    }
}

#[async_trait]
impl AnswerService for RecordingServices {
    async fn create_answer(
        &self,
        _question_id: QuestionId,
        _user_id: &str,
        _text: &str,
    ) -> DomainResult<Answer> {
        self.record().await;
        Err(DomainError::ValidationFailed)
    }

    async fn get_answer(&self, _id: AnswerId) -> DomainResult<Answer> {
        self.record().await;
        Err(DomainError::AnswerNotFound)
    }

    async fn get_answers_by_question(&self, _question_id: QuestionId) -> DomainResult<Vec<Answer>> {
        self.record().await;
        Ok(Vec::new())
    }

    async fn delete_answer(&self, _id: AnswerId) -> DomainResult<()> {
        self.record().await;
        Ok(())
    }
}

fn recording_app(services: Arc<RecordingServices>, config: Config) -> axum::Router {
    app_with(services.clone(), services, config)
}

#[rstest]
#[case("GET", "/questions/abc", None)]
#[case("DELETE", "/questions/abc", None)]
#[case("POST", "/questions/abc/answers/", Some(r#"{"user_id":"u","text":"t"}"#))]
#[case("GET", "/answers/abc", None)]
#[case("DELETE", "/answers/1.5", None)]
#[case("GET", "/questions/%FF", None)]
#[case("POST", "/questions/%C3%28/answers/", Some(r#"{"user_id":"u","text":"t"}"#))]
#[case("DELETE", "/answers/%FF", None)]
#[tokio::test]
async fn malformed_id_is_rejected_before_any_service_call(
    #[case] method: &str,
    #[case] uri: &str,
    #[case] body: Option<&str>,
) {
    let services = Arc::new(RecordingServices::default());
    let app = recording_app(services.clone(), Config::default());

    let response = send(&app, method, uri, body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "invalid id format");
    assert_eq!(services.calls(), 0);
}

#[rstest]
#[case("/questions/", r#"{"text": "unterminated"#)]
#[case("/questions/", "not json at all")]
#[case("/questions/", "")]
#[case("/questions/1/answers/", r#"{"user_id": 5, "text": "wrong type"}"#)]
#[tokio::test]
async fn malformed_json_is_rejected_before_any_service_call(#[case] uri: &str, #[case] body: &str) {
    let services = Arc::new(RecordingServices::default());
    let app = recording_app(services.clone(), Config::default());

    let response = send(&app, "POST", uri, Some(body)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "invalid JSON format");
    assert_eq!(services.calls(), 0);
}

#[tokio::test]
async fn bad_id_wins_over_bad_body() {
    let services = Arc::new(RecordingServices::default());
    let app = recording_app(services.clone(), Config::default());

    let response = send(&app, "POST", "/questions/x/answers/", Some("{")).await;

    assert_eq!(response.error_message(), "invalid id format");
}

#[tokio::test]
async fn domain_error_status_and_message_come_from_the_error() {
    let services = Arc::new(RecordingServices::default());
    let app = recording_app(services.clone(), Config::default());

    let response = send(&app, "POST", "/questions/", Some(r#"{"text":"ok"}"#)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "validation failed");
    assert_eq!(services.calls(), 1);
}

#[tokio::test]
async fn stalled_service_hits_the_request_deadline() {
    let services = Arc::new(RecordingServices {
        calls: AtomicUsize::new(0),
        stall: Some(Duration::from_secs(5)),
    });
    let mut config = Config::default();
    config.server.request_timeout = Duration::from_millis(50);
    let app = recording_app(services.clone(), config);

    let started = std::time::Instant::now();
    let response = send(&app, "GET", "/questions/", None).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_message(), "database query error");
}
